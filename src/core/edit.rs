use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::engine::MAX_CONTRACT_YEARS;
use super::types::Inputs;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("unknown input field '{0}'")]
    UnknownField(String),
    #[error("cannot parse '{raw}' as a value for {field}")]
    Unparseable { field: InputField, raw: String },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum InputField {
    InstitutionName,
    AnnualRevenue,
    LoanPortfolioSize,
    DepositVolume,
    BranchCount,
    RetailCustomers,
    BusinessCustomers,
    CommercialCustomers,
    StaffHoursPerMonth,
    HourlyRate,
    ManualProcessingCost,
    ComplianceFines,
    TrainingCosts,
    InfrastructureCosts,
    AvgLoanProcessingDays,
    CustomerOnboardingDays,
    SolutionCost,
    ImplementationCost,
    ContractYears,
    DiscountRate,
    ProcessTimeReduction,
    OnboardingTimeReduction,
    StaffEfficiencyGain,
    ComplianceRiskReduction,
    CustomerRetentionImprovement,
    CrossSellRate,
    LoanMargin,
    NewLoansPerMonth,
    AvgLoanValue,
}

impl InputField {
    pub const ALL: [InputField; 29] = [
        InputField::InstitutionName,
        InputField::AnnualRevenue,
        InputField::LoanPortfolioSize,
        InputField::DepositVolume,
        InputField::BranchCount,
        InputField::RetailCustomers,
        InputField::BusinessCustomers,
        InputField::CommercialCustomers,
        InputField::StaffHoursPerMonth,
        InputField::HourlyRate,
        InputField::ManualProcessingCost,
        InputField::ComplianceFines,
        InputField::TrainingCosts,
        InputField::InfrastructureCosts,
        InputField::AvgLoanProcessingDays,
        InputField::CustomerOnboardingDays,
        InputField::SolutionCost,
        InputField::ImplementationCost,
        InputField::ContractYears,
        InputField::DiscountRate,
        InputField::ProcessTimeReduction,
        InputField::OnboardingTimeReduction,
        InputField::StaffEfficiencyGain,
        InputField::ComplianceRiskReduction,
        InputField::CustomerRetentionImprovement,
        InputField::CrossSellRate,
        InputField::LoanMargin,
        InputField::NewLoansPerMonth,
        InputField::AvgLoanValue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InputField::InstitutionName => "institutionName",
            InputField::AnnualRevenue => "annualRevenue",
            InputField::LoanPortfolioSize => "loanPortfolioSize",
            InputField::DepositVolume => "depositVolume",
            InputField::BranchCount => "branchCount",
            InputField::RetailCustomers => "retailCustomers",
            InputField::BusinessCustomers => "businessCustomers",
            InputField::CommercialCustomers => "commercialCustomers",
            InputField::StaffHoursPerMonth => "staffHoursPerMonth",
            InputField::HourlyRate => "hourlyRate",
            InputField::ManualProcessingCost => "manualProcessingCost",
            InputField::ComplianceFines => "complianceFines",
            InputField::TrainingCosts => "trainingCosts",
            InputField::InfrastructureCosts => "infrastructureCosts",
            InputField::AvgLoanProcessingDays => "avgLoanProcessingDays",
            InputField::CustomerOnboardingDays => "customerOnboardingDays",
            InputField::SolutionCost => "solutionCost",
            InputField::ImplementationCost => "implementationCost",
            InputField::ContractYears => "contractYears",
            InputField::DiscountRate => "discountRate",
            InputField::ProcessTimeReduction => "processTimeReduction",
            InputField::OnboardingTimeReduction => "onboardingTimeReduction",
            InputField::StaffEfficiencyGain => "staffEfficiencyGain",
            InputField::ComplianceRiskReduction => "complianceRiskReduction",
            InputField::CustomerRetentionImprovement => "customerRetentionImprovement",
            InputField::CrossSellRate => "crossSellRate",
            InputField::LoanMargin => "loanMargin",
            InputField::NewLoansPerMonth => "newLoansPerMonth",
            InputField::AvgLoanValue => "avgLoanValue",
        }
    }

    pub fn is_text(self) -> bool {
        self == InputField::InstitutionName
    }

    pub fn is_whole_number(self) -> bool {
        self == InputField::ContractYears
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InputField {
    type Err = EditError;

    // `annualRevenue`, `annual-revenue` and `annual_revenue` all match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        InputField::ALL
            .into_iter()
            .find(|field| normalize_key(field.name()) == key)
            .ok_or_else(|| EditError::UnknownField(s.to_string()))
    }
}

fn normalize_key(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl Inputs {
    pub fn edit(&self, field: InputField, raw: &str) -> Result<Inputs, EditError> {
        let mut next = self.clone();
        if field.is_text() {
            next.institution_name = raw.to_string();
            return Ok(next);
        }

        let unparseable = || EditError::Unparseable {
            field,
            raw: raw.to_string(),
        };

        if field.is_whole_number() {
            next.contract_years = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|years| *years <= MAX_CONTRACT_YEARS)
                .ok_or_else(unparseable)?;
            return Ok(next);
        }

        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(unparseable)?;
        next.set_number(field, value)?;
        Ok(next)
    }

    pub fn set_number(&mut self, field: InputField, value: f64) -> Result<(), EditError> {
        let unparseable = || EditError::Unparseable {
            field,
            raw: value.to_string(),
        };
        if !value.is_finite() {
            return Err(unparseable());
        }

        let slot = match field {
            InputField::InstitutionName => return Err(unparseable()),
            InputField::ContractYears => {
                if value < 0.0 || value.fract() != 0.0 || value > f64::from(MAX_CONTRACT_YEARS) {
                    return Err(unparseable());
                }
                self.contract_years = value as u32;
                return Ok(());
            }
            InputField::AnnualRevenue => &mut self.annual_revenue,
            InputField::LoanPortfolioSize => &mut self.loan_portfolio_size,
            InputField::DepositVolume => &mut self.deposit_volume,
            InputField::BranchCount => &mut self.branch_count,
            InputField::RetailCustomers => &mut self.retail_customers,
            InputField::BusinessCustomers => &mut self.business_customers,
            InputField::CommercialCustomers => &mut self.commercial_customers,
            InputField::StaffHoursPerMonth => &mut self.staff_hours_per_month,
            InputField::HourlyRate => &mut self.hourly_rate,
            InputField::ManualProcessingCost => &mut self.manual_processing_cost,
            InputField::ComplianceFines => &mut self.compliance_fines,
            InputField::TrainingCosts => &mut self.training_costs,
            InputField::InfrastructureCosts => &mut self.infrastructure_costs,
            InputField::AvgLoanProcessingDays => &mut self.avg_loan_processing_days,
            InputField::CustomerOnboardingDays => &mut self.customer_onboarding_days,
            InputField::SolutionCost => &mut self.solution_cost,
            InputField::ImplementationCost => &mut self.implementation_cost,
            InputField::DiscountRate => &mut self.discount_rate,
            InputField::ProcessTimeReduction => &mut self.process_time_reduction,
            InputField::OnboardingTimeReduction => &mut self.onboarding_time_reduction,
            InputField::StaffEfficiencyGain => &mut self.staff_efficiency_gain,
            InputField::ComplianceRiskReduction => &mut self.compliance_risk_reduction,
            InputField::CustomerRetentionImprovement => &mut self.customer_retention_improvement,
            InputField::CrossSellRate => &mut self.cross_sell_rate,
            InputField::LoanMargin => &mut self.loan_margin,
            InputField::NewLoansPerMonth => &mut self.new_loans_per_month,
            InputField::AvgLoanValue => &mut self.avg_loan_value,
        };
        *slot = value;
        Ok(())
    }

    pub fn field_value(&self, field: InputField) -> String {
        match field {
            InputField::InstitutionName => self.institution_name.clone(),
            InputField::ContractYears => self.contract_years.to_string(),
            InputField::AnnualRevenue => self.annual_revenue.to_string(),
            InputField::LoanPortfolioSize => self.loan_portfolio_size.to_string(),
            InputField::DepositVolume => self.deposit_volume.to_string(),
            InputField::BranchCount => self.branch_count.to_string(),
            InputField::RetailCustomers => self.retail_customers.to_string(),
            InputField::BusinessCustomers => self.business_customers.to_string(),
            InputField::CommercialCustomers => self.commercial_customers.to_string(),
            InputField::StaffHoursPerMonth => self.staff_hours_per_month.to_string(),
            InputField::HourlyRate => self.hourly_rate.to_string(),
            InputField::ManualProcessingCost => self.manual_processing_cost.to_string(),
            InputField::ComplianceFines => self.compliance_fines.to_string(),
            InputField::TrainingCosts => self.training_costs.to_string(),
            InputField::InfrastructureCosts => self.infrastructure_costs.to_string(),
            InputField::AvgLoanProcessingDays => self.avg_loan_processing_days.to_string(),
            InputField::CustomerOnboardingDays => self.customer_onboarding_days.to_string(),
            InputField::SolutionCost => self.solution_cost.to_string(),
            InputField::ImplementationCost => self.implementation_cost.to_string(),
            InputField::DiscountRate => self.discount_rate.to_string(),
            InputField::ProcessTimeReduction => self.process_time_reduction.to_string(),
            InputField::OnboardingTimeReduction => self.onboarding_time_reduction.to_string(),
            InputField::StaffEfficiencyGain => self.staff_efficiency_gain.to_string(),
            InputField::ComplianceRiskReduction => self.compliance_risk_reduction.to_string(),
            InputField::CustomerRetentionImprovement => {
                self.customer_retention_improvement.to_string()
            }
            InputField::CrossSellRate => self.cross_sell_rate.to_string(),
            InputField::LoanMargin => self.loan_margin.to_string(),
            InputField::NewLoansPerMonth => self.new_loans_per_month.to_string(),
            InputField::AvgLoanValue => self.avg_loan_value.to_string(),
        }
    }
}
