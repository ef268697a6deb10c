use serde::{Deserialize, Serialize};
use std::fmt;

/// Financing product offered for a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Purchase,
    Finance,
    Lease,
}

impl ProductType {
    pub const fn ordered() -> [Self; 3] {
        [Self::Lease, Self::Finance, Self::Purchase]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Purchase => "Purchase",
            Self::Finance => "Finance",
            Self::Lease => "Lease",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Finance => "finance",
            Self::Lease => "lease",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductType {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "purchase" | "cash" => Ok(Self::Purchase),
            "finance" => Ok(Self::Finance),
            "lease" => Ok(Self::Lease),
            _ => Err(ProfileError::Unparsable {
                field: ProfileField::Product,
                raw: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentStatus {
    FullTime,
    PartTime,
    SelfEmployed,
    Retired,
    Other,
}

impl EmploymentStatus {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "full-time" | "full_time" | "fulltime" => Some(Self::FullTime),
            "part-time" | "part_time" | "parttime" => Some(Self::PartTime),
            "self-employed" | "self_employed" => Some(Self::SelfEmployed),
            "retired" => Some(Self::Retired),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FullTime => "Full-Time Employed",
            Self::PartTime => "Part-Time Employed",
            Self::SelfEmployed => "Self-Employed",
            Self::Retired => "Retired",
            Self::Other => "Other",
        }
    }
}

/// Profile form exactly as the presentation layer submits it: every field is an
/// optional string. This is also the payload forwarded to the advisory endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_income: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
}

/// Names the profile inputs so errors can point at the offending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    CreditScore,
    AnnualIncome,
    DownPayment,
    CarPrice,
    EmploymentStatus,
    MonthlyBudget,
    Product,
}

impl ProfileField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreditScore => "credit score",
            Self::AnnualIncome => "annual income",
            Self::DownPayment => "down payment",
            Self::CarPrice => "car price",
            Self::EmploymentStatus => "employment status",
            Self::MonthlyBudget => "monthly budget",
            Self::Product => "financing option",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("{} is missing", .0.label())]
    Missing(ProfileField),
    #[error("{} '{raw}' is not a finite, non-negative value", .field.label())]
    Unparsable { field: ProfileField, raw: String },
}

/// Result of parsing one form input. Parsing never rejects the profile; it only
/// records whether the value can feed a calculation.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedField<T> {
    Missing,
    Invalid(String),
    Valid(T),
}

impl<T: Copy> ParsedField<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            ParsedField::Valid(value) => Some(*value),
            _ => None,
        }
    }

    pub fn require(&self, field: ProfileField) -> Result<T, ProfileError> {
        match self {
            ParsedField::Valid(value) => Ok(*value),
            ParsedField::Missing => Err(ProfileError::Missing(field)),
            ParsedField::Invalid(raw) => Err(ProfileError::Unparsable {
                field,
                raw: raw.clone(),
            }),
        }
    }

    /// A blank input counts as `default`; an unparsable one stays unusable.
    pub fn or_blank(&self, default: T) -> Option<T> {
        match self {
            ParsedField::Valid(value) => Some(*value),
            ParsedField::Missing => Some(default),
            ParsedField::Invalid(_) => None,
        }
    }
}

fn non_blank(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn parse_amount(raw: &Option<String>) -> ParsedField<f64> {
    let Some(value) = non_blank(raw) else {
        return ParsedField::Missing;
    };

    let cleaned: String = value
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | '_' | ' '))
        .collect();

    match cleaned.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => ParsedField::Valid(amount),
        _ => ParsedField::Invalid(value.to_string()),
    }
}

/// Accepts a plain score (`"712"`) or a bucketed range (`"740-799"`), in which
/// case the lower bound is used.
fn parse_credit_score(raw: &Option<String>) -> ParsedField<u16> {
    let Some(value) = non_blank(raw) else {
        return ParsedField::Missing;
    };

    let lower = value.split('-').next().unwrap_or(value).trim();
    match lower.parse::<u16>() {
        Ok(score) => ParsedField::Valid(score),
        Err(_) => ParsedField::Invalid(value.to_string()),
    }
}

fn parse_employment(raw: &Option<String>) -> ParsedField<EmploymentStatus> {
    let Some(value) = non_blank(raw) else {
        return ParsedField::Missing;
    };

    match EmploymentStatus::parse(value) {
        Some(status) => ParsedField::Valid(status),
        None => ParsedField::Invalid(value.to_string()),
    }
}

/// Validated applicant profile. Immutable once built; downstream components only
/// see parsed values.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantProfile {
    form: ProfileForm,
    pub credit_score: ParsedField<u16>,
    pub annual_income: ParsedField<f64>,
    pub down_payment: ParsedField<f64>,
    pub car_price: ParsedField<f64>,
    pub employment_status: ParsedField<EmploymentStatus>,
    pub monthly_budget: ParsedField<f64>,
}

impl ApplicantProfile {
    pub fn from_form(form: ProfileForm) -> Self {
        Self {
            credit_score: parse_credit_score(&form.credit_score),
            annual_income: parse_amount(&form.annual_income),
            down_payment: parse_amount(&form.down_payment),
            car_price: parse_amount(&form.car_price),
            employment_status: parse_employment(&form.employment_status),
            monthly_budget: parse_amount(&form.monthly_budget),
            form,
        }
    }

    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn credit_score(&self) -> Result<u16, ProfileError> {
        self.credit_score.require(ProfileField::CreditScore)
    }

    pub fn down_payment(&self) -> Result<f64, ProfileError> {
        self.down_payment.require(ProfileField::DownPayment)
    }

    pub fn car_price(&self) -> Result<f64, ProfileError> {
        self.car_price.require(ProfileField::CarPrice)
    }

    /// Every field that could not be parsed, in form order.
    pub fn issues(&self) -> Vec<ProfileError> {
        [
            self.credit_score
                .require(ProfileField::CreditScore)
                .err(),
            self.annual_income
                .require(ProfileField::AnnualIncome)
                .err(),
            self.down_payment
                .require(ProfileField::DownPayment)
                .err(),
            self.car_price.require(ProfileField::CarPrice).err(),
            self.employment_status
                .require(ProfileField::EmploymentStatus)
                .err(),
            self.monthly_budget
                .require(ProfileField::MonthlyBudget)
                .err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl From<ProfileForm> for ApplicantProfile {
    fn from(form: ProfileForm) -> Self {
        Self::from_form(form)
    }
}
