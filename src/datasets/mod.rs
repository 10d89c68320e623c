//! Datasets served by the API.
//!
//! Each dataset pairs one raw source with a fixed reshaping step:
//! - [`housing`]: FRED house price, income and homeownership series
//! - [`employment`]: World Bank employment-in-industry, pivoted by country
//! - [`debt`]: household debt balance report
//! - [`survey`]: header-driven tables (inequality, class identification, manufacturing)
//! - [`parse`]: cell coercion shared by the file-backed datasets

pub mod debt;
pub mod employment;
pub mod housing;
pub mod parse;
pub mod survey;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::Result;
use crate::sources::Sources;

pub use debt::DebtBalanceRow;
pub use employment::EmploymentRow;
pub use housing::{HomeownershipRow, HousingAffordabilityRow};
pub use parse::Label;
pub use survey::{LabeledRow, LabeledTable, NumericTable};

/// Every dataset the service exposes, in index-page order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Dataset {
    /// Median house price joined with real median household income.
    MedianPriceVsHouseholdIncome,
    /// US homeownership rate.
    HomeownershipRate,
    /// Employment in industry by country.
    EmploymentIndustry,
    /// Household debt balance by quarter.
    DebtBalance,
    /// Income share by group.
    IncomeInequality,
    /// Gallup social class self-identification.
    ClassIdentification,
    /// Manufacturing output by country, 2019.
    #[strum(serialize = "global-manufacturing-2019")]
    GlobalManufacturing2019,
}

impl Dataset {
    /// URL path the dataset is served under.
    pub fn path(&self) -> &'static str {
        match self {
            Dataset::MedianPriceVsHouseholdIncome => {
                "/api/median_price_houses_sold/median_household_income"
            }
            Dataset::HomeownershipRate => "/api/homeownership_rate_usa",
            Dataset::EmploymentIndustry => "/api/employment_industry",
            Dataset::DebtBalance => "/api/debt_balance",
            Dataset::IncomeInequality => "/api/income_inequality",
            Dataset::ClassIdentification => "/api/class_identification_gallup",
            Dataset::GlobalManufacturing2019 => "/api/global_manufacturing_2019",
        }
    }

    /// Name used in metric labels and logs.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Whether building the dataset calls a remote provider.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Dataset::MedianPriceVsHouseholdIncome
                | Dataset::HomeownershipRate
                | Dataset::EmploymentIndustry
        )
    }

    /// Build the dataset and serialize it to a JSON array of records.
    pub async fn to_json(&self, sources: &Sources) -> Result<String> {
        let json = match self {
            Dataset::MedianPriceVsHouseholdIncome => {
                serde_json::to_string(&housing::load_price_vs_income(&sources.fred).await?)?
            }
            Dataset::HomeownershipRate => {
                serde_json::to_string(&housing::load_homeownership(&sources.fred).await?)?
            }
            Dataset::EmploymentIndustry => {
                serde_json::to_string(&employment::load(&sources.worldbank).await?)?
            }
            Dataset::DebtBalance => serde_json::to_string(&debt::load(&sources.files).await?)?,
            Dataset::IncomeInequality => {
                serde_json::to_string(&survey::load_income_inequality(&sources.files).await?)?
            }
            Dataset::ClassIdentification => {
                serde_json::to_string(&survey::load_class_identification(&sources.files).await?)?
            }
            Dataset::GlobalManufacturing2019 => {
                serde_json::to_string(&survey::load_global_manufacturing(&sources.files).await?)?
            }
        };
        Ok(json)
    }
}
