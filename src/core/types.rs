use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CalculationMode {
    Simple,
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inputs {
    pub institution_name: String,

    pub annual_revenue: f64,
    pub loan_portfolio_size: f64,
    pub deposit_volume: f64,
    pub branch_count: f64,
    pub retail_customers: f64,
    pub business_customers: f64,
    pub commercial_customers: f64,

    pub staff_hours_per_month: f64,
    pub hourly_rate: f64,
    pub manual_processing_cost: f64,
    pub compliance_fines: f64,
    pub training_costs: f64,
    pub infrastructure_costs: f64,
    pub avg_loan_processing_days: f64,
    pub customer_onboarding_days: f64,

    pub solution_cost: f64,
    pub implementation_cost: f64,
    pub contract_years: u32,
    pub discount_rate: f64,

    pub process_time_reduction: f64,
    pub onboarding_time_reduction: f64,
    pub staff_efficiency_gain: f64,
    pub compliance_risk_reduction: f64,
    pub customer_retention_improvement: f64,
    pub cross_sell_rate: f64,
    pub loan_margin: f64,

    pub new_loans_per_month: f64,
    pub avg_loan_value: f64,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            institution_name: "Community Bank".to_string(),

            annual_revenue: 50_000_000.0,
            loan_portfolio_size: 250_000_000.0,
            deposit_volume: 400_000_000.0,
            branch_count: 12.0,
            retail_customers: 25_000.0,
            business_customers: 3_000.0,
            commercial_customers: 500.0,

            staff_hours_per_month: 2_000.0,
            hourly_rate: 50.0,
            manual_processing_cost: 250_000.0,
            compliance_fines: 100_000.0,
            training_costs: 80_000.0,
            infrastructure_costs: 150_000.0,
            avg_loan_processing_days: 14.0,
            customer_onboarding_days: 5.0,

            solution_cost: 300_000.0,
            implementation_cost: 150_000.0,
            contract_years: 3,
            discount_rate: 0.08,

            process_time_reduction: 0.50,
            onboarding_time_reduction: 0.60,
            staff_efficiency_gain: 0.40,
            compliance_risk_reduction: 0.30,
            customer_retention_improvement: 0.02,
            cross_sell_rate: 0.05,
            loan_margin: 0.03,

            new_loans_per_month: 100.0,
            avg_loan_value: 50_000.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metric {
    Defined(f64),
    Undefined,
}

impl Metric {
    pub fn from_value(value: f64) -> Self {
        if value.is_finite() {
            Metric::Defined(value)
        } else {
            Metric::Undefined
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Defined(v) => Some(v),
            Metric::Undefined => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionYear {
    pub year: u32,
    pub cost_savings: f64,
    pub revenue_gains: f64,
    pub total_benefits: f64,
    pub cumulative: f64,
    pub roi: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub annual_staff_cost: f64,
    pub current_total_costs: f64,
    pub total_customers: f64,

    pub staff_cost_savings: f64,
    pub compliance_savings: f64,
    pub processing_cost_savings: f64,
    pub training_savings: f64,
    pub total_cost_savings: f64,

    pub faster_processing_revenue: f64,
    pub cross_sell_revenue: f64,
    pub retention_revenue: f64,
    pub nim_improvement: f64,
    pub total_revenue_gain: f64,

    pub total_benefits: f64,
    pub net_benefit: f64,
    pub roi_percent: Metric,
    pub payback_months: Metric,
    pub npv: Metric,

    pub cost_per_loan: Metric,
    pub revenue_per_customer: Metric,
    pub efficiency_ratio: Metric,
    pub time_saved_per_loan: f64,
    pub time_saved_per_onboarding: f64,

    pub projection: Vec<ProjectionYear>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMetrics {
    pub annual_savings: f64,
    pub net_benefit: f64,
    pub roi_percent: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Calculation {
    Simple(SimpleMetrics),
    Full(DerivedMetrics),
}

impl Calculation {
    pub fn roi_percent(&self) -> Metric {
        match self {
            Calculation::Simple(m) => m.roi_percent,
            Calculation::Full(m) => m.roi_percent,
        }
    }
}
