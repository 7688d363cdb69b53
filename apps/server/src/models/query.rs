//! List query parameters
//!
//! `sortBy` takes `field:asc` or `field:desc` with field `name` or `createdAt`;
//! direction defaults to ascending. Identifier filters match documents whose
//! set contains that id.

use crate::{
    db::{Clause, Filter, PageRequest, SetField, SortField},
    Error, Result,
};
use registry_models::EntityId;
use serde::Deserialize;
use validator::Validate;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// A list query that can be turned into a store filter and page request.
pub trait ListQuery: Validate {
    fn filter(&self) -> Result<Filter>;

    fn paging(&self) -> (Option<&str>, Option<u32>, Option<u32>);

    fn page_request(&self) -> Result<PageRequest> {
        let (sort_by, limit, page) = self.paging();
        let mut request = PageRequest {
            page: page.unwrap_or(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
            ..PageRequest::default()
        };
        if let Some(sort_by) = sort_by {
            let (field, descending) = parse_sort_by(sort_by)?;
            request.sort_by = field;
            request.descending = descending;
        }
        Ok(request)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClinicListQuery {
    pub name: Option<String>,
    #[validate(custom(function = "super::requests::entity_id"))]
    pub doctors: Option<String>,
    #[validate(custom(function = "super::requests::entity_id"))]
    pub health_services: Option<String>,
    pub sort_by: Option<String>,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub limit: Option<u32>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub page: Option<u32>,
}

impl ListQuery for ClinicListQuery {
    fn filter(&self) -> Result<Filter> {
        let filter = name_filter(Filter::all(), self.name.as_deref());
        let filter = contains(filter, SetField::Doctors, self.doctors.as_deref())?;
        contains(filter, SetField::HealthServices, self.health_services.as_deref())
    }

    fn paging(&self) -> (Option<&str>, Option<u32>, Option<u32>) {
        (self.sort_by.as_deref(), self.limit, self.page)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DoctorListQuery {
    pub name: Option<String>,
    #[validate(custom(function = "super::requests::entity_id"))]
    pub clinics: Option<String>,
    #[validate(custom(function = "super::requests::entity_id"))]
    pub health_services: Option<String>,
    pub sort_by: Option<String>,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub limit: Option<u32>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub page: Option<u32>,
}

impl ListQuery for DoctorListQuery {
    fn filter(&self) -> Result<Filter> {
        let filter = name_filter(Filter::all(), self.name.as_deref());
        let filter = contains(filter, SetField::Clinics, self.clinics.as_deref())?;
        contains(filter, SetField::HealthServices, self.health_services.as_deref())
    }

    fn paging(&self) -> (Option<&str>, Option<u32>, Option<u32>) {
        (self.sort_by.as_deref(), self.limit, self.page)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HealthServiceListQuery {
    pub name: Option<String>,
    pub sort_by: Option<String>,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub limit: Option<u32>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub page: Option<u32>,
}

impl ListQuery for HealthServiceListQuery {
    fn filter(&self) -> Result<Filter> {
        Ok(name_filter(Filter::all(), self.name.as_deref()))
    }

    fn paging(&self) -> (Option<&str>, Option<u32>, Option<u32>) {
        (self.sort_by.as_deref(), self.limit, self.page)
    }
}

fn name_filter(filter: Filter, name: Option<&str>) -> Filter {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => filter.and(Clause::NameEquals(name.to_string())),
        _ => filter,
    }
}

fn contains(filter: Filter, field: SetField, id: Option<&str>) -> Result<Filter> {
    match id {
        Some(id) => Ok(filter.and(Clause::Contains(field, EntityId::parse(id)?))),
        None => Ok(filter),
    }
}

fn parse_sort_by(value: &str) -> Result<(SortField, bool)> {
    let (field, direction) = value.split_once(':').unwrap_or((value, "asc"));
    let field = match field.trim() {
        "name" => SortField::Name,
        "createdAt" => SortField::CreatedAt,
        other => {
            return Err(Error::Validation(format!(
                "\"sortBy\" cannot sort by '{other}'"
            )))
        }
    };
    let descending = match direction.trim() {
        "asc" => false,
        "desc" => true,
        other => {
            return Err(Error::Validation(format!(
                "\"sortBy\" direction must be 'asc' or 'desc', got '{other}'"
            )))
        }
    };
    Ok((field, descending))
}
