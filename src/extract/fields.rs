//! Defensive field readers over raw job payloads
//!
//! Listing and detail payloads share the site's field names; structured data
//! follows the schema.org `JobPosting` vocabulary. Both views answer the same
//! [`Field`] questions so the record builder can treat them uniformly.

use crate::extract::record::format_salary_range;
use serde_json::Value;

/// A question a source payload can answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Title,
    /// Hiring company (`contratante` / `hiringOrganization`)
    Employer,
    /// Publishing company (`anunciante`); listing and detail only
    Advertiser,
    Location,
    Salary,
    EmploymentType,
    Description,
    Benefits,
    DatePosted,
}

/// View over a listing or detail payload
#[derive(Debug, Clone, Copy)]
pub struct JobView<'a> {
    /// `job_customized_data` when present, else the job itself
    data: &'a Value,
    job: &'a Value,
}

impl<'a> JobView<'a> {
    pub fn new(job: &'a Value) -> Self {
        let data = job
            .get("job_customized_data")
            .filter(|d| d.is_object())
            .unwrap_or(job);
        Self { data, job }
    }

    /// Reads one field; empty strings count as absent
    pub fn get(&self, field: Field) -> Option<String> {
        match field {
            Field::Id => self.first(&["id"]),
            Field::Title => self.first(&["titulo"]),
            Field::Employer => self.nested_name("contratante"),
            Field::Advertiser => self.nested_name("anunciante"),
            Field::Location => self.location(),
            Field::Salary => self.first(&["faixaSalarial", "salario"]),
            Field::EmploymentType => self.first(&["regimeContrato", "tipoContrato"]),
            Field::Description => self.first(&["descricao"]),
            Field::Benefits => self.benefits(),
            Field::DatePosted => self.first(&["dataAtualizacao", "dataPublicacao"]),
        }
    }

    fn lookup(&self, key: &str) -> Option<&'a Value> {
        self.data.get(key).or_else(|| self.job.get(key))
    }

    fn first(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| scalar_text(self.lookup(key)?))
    }

    fn nested_name(&self, key: &str) -> Option<String> {
        scalar_text(self.lookup(key)?.get("nome")?)
    }

    fn location(&self) -> Option<String> {
        let from_entries = self
            .lookup("vagas")
            .and_then(Value::as_array)
            .and_then(|entries| entries.first())
            .and_then(|entry| {
                join_place(
                    entry.get("cidade").and_then(scalar_text),
                    entry.get("uf").and_then(scalar_text),
                )
            });
        if from_entries.is_some() {
            return from_entries;
        }

        let city = self.first(&["cidade"]);
        let state = self.first(&["uf"]);
        if city.is_some() && state.is_some() {
            return join_place(city, state);
        }

        self.first(&["localizacao"])
    }

    fn benefits(&self) -> Option<String> {
        let items = self.lookup("beneficios")?.as_array()?;
        let names: Vec<String> = items
            .iter()
            .filter_map(|item| match item {
                Value::Object(_) => item
                    .get("nome")
                    .or_else(|| item.get("descricao"))
                    .and_then(scalar_text),
                other => scalar_text(other),
            })
            .collect();

        (!names.is_empty()).then(|| names.join(", "))
    }
}

/// View over a schema.org `JobPosting` object
#[derive(Debug, Clone, Copy)]
pub struct PostingView<'a> {
    posting: &'a Value,
}

impl<'a> PostingView<'a> {
    pub fn new(posting: &'a Value) -> Self {
        Self { posting }
    }

    pub fn get(&self, field: Field) -> Option<String> {
        match field {
            Field::Id => self
                .posting
                .pointer("/identifier/value")
                .and_then(scalar_text),
            Field::Title => self.text("title"),
            Field::Employer => match self.posting.get("hiringOrganization")? {
                Value::Object(_) => self
                    .posting
                    .pointer("/hiringOrganization/name")
                    .and_then(scalar_text),
                other => scalar_text(other),
            },
            Field::Advertiser | Field::Benefits => None,
            Field::Location => self.location(),
            Field::Salary => self.salary(),
            Field::EmploymentType => match self.posting.get("employmentType")? {
                Value::Array(types) => {
                    let types: Vec<String> = types.iter().filter_map(scalar_text).collect();
                    (!types.is_empty()).then(|| types.join(", "))
                }
                other => scalar_text(other),
            },
            Field::Description => self.text("description"),
            Field::DatePosted => self.text("datePosted"),
        }
    }

    fn text(&self, key: &str) -> Option<String> {
        scalar_text(self.posting.get(key)?)
    }

    fn location(&self) -> Option<String> {
        let place = match self.posting.get("jobLocation")? {
            Value::Array(places) => places.first()?,
            other => other,
        };

        match place.get("address") {
            Some(Value::String(address)) => non_empty(address),
            Some(address) => join_place(
                address.get("addressLocality").and_then(scalar_text),
                address.get("addressRegion").and_then(scalar_text),
            ),
            None => join_place(
                place.get("addressLocality").and_then(scalar_text),
                place.get("addressRegion").and_then(scalar_text),
            ),
        }
    }

    fn salary(&self) -> Option<String> {
        let base = self.posting.get("baseSalary")?;
        let currency = base.get("currency").and_then(Value::as_str);

        match base.get("value")? {
            Value::Object(_) => {
                let value = base.get("value")?;
                let min = value.get("minValue").and_then(number);
                let max = value.get("maxValue").and_then(number);
                if min.is_none() && max.is_none() {
                    format_salary_range(value.get("value").and_then(number), None, currency)
                } else {
                    format_salary_range(min, max, currency)
                }
            }
            single => format_salary_range(number(single), None, currency),
        }
    }
}

/// Joins the non-empty parts of a place as `"City, State"`
fn join_place(city: Option<String>, state: Option<String>) -> Option<String> {
    let parts: Vec<String> = [city, state].into_iter().flatten().collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Text of a string or number value, trimmed, `None` when empty
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Numeric value of a number or numeric string
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
