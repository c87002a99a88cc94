use super::types::{
    Calculation, CalculationMode, DerivedMetrics, Inputs, Metric, ProjectionYear, SimpleMetrics,
};

pub const TRAINING_SAVINGS_SHARE: f64 = 0.5;
pub const FASTER_PROCESSING_CAPTURE: f64 = 0.4;
pub const CROSS_SELL_PRODUCT_VALUE: f64 = 150.0;
// 20 bps on the loan portfolio.
pub const NIM_IMPROVEMENT_RATE: f64 = 0.002;
pub const SIMPLE_SAVINGS_RATE: f64 = 0.02;

// Longer terms are rejected on edit and capped by the engine.
pub const MAX_CONTRACT_YEARS: u32 = 100;

const MONTHS_PER_YEAR: f64 = 12.0;

pub fn calculate(inputs: &Inputs, mode: CalculationMode) -> Calculation {
    let calculation = match mode {
        CalculationMode::Simple => Calculation::Simple(compute_simple(inputs)),
        CalculationMode::Full => Calculation::Full(compute(inputs)),
    };
    log::debug!(
        "calculated {:?} metrics for {}: roi={:?}",
        mode,
        inputs.institution_name,
        calculation.roi_percent()
    );
    calculation
}

pub fn compute_simple(inputs: &Inputs) -> SimpleMetrics {
    let annual_savings = inputs.annual_revenue * SIMPLE_SAVINGS_RATE;
    let net_benefit = annual_savings - inputs.solution_cost;
    SimpleMetrics {
        annual_savings,
        net_benefit,
        roi_percent: roi_percent(net_benefit, inputs.solution_cost),
    }
}

pub fn compute(inputs: &Inputs) -> DerivedMetrics {
    let annual_staff_cost = inputs.staff_hours_per_month * MONTHS_PER_YEAR * inputs.hourly_rate;

    let staff_cost_savings = annual_staff_cost * inputs.staff_efficiency_gain;
    let compliance_savings = inputs.compliance_fines * inputs.compliance_risk_reduction;
    let processing_cost_savings = inputs.manual_processing_cost * inputs.process_time_reduction;
    let training_savings = inputs.training_costs * TRAINING_SAVINGS_SHARE;
    let total_cost_savings =
        staff_cost_savings + compliance_savings + processing_cost_savings + training_savings;

    let total_customers =
        inputs.retail_customers + inputs.business_customers + inputs.commercial_customers;

    let faster_processing_revenue = (inputs.new_loans_per_month
        * MONTHS_PER_YEAR
        * inputs.process_time_reduction
        * FASTER_PROCESSING_CAPTURE)
        * inputs.avg_loan_value
        * inputs.loan_margin;
    let cross_sell_revenue = total_customers * inputs.cross_sell_rate * CROSS_SELL_PRODUCT_VALUE;
    let retention_revenue = inputs.annual_revenue * inputs.customer_retention_improvement;
    let nim_improvement = inputs.loan_portfolio_size * NIM_IMPROVEMENT_RATE;
    let total_revenue_gain =
        faster_processing_revenue + cross_sell_revenue + retention_revenue + nim_improvement;

    let total_benefits = total_cost_savings + total_revenue_gain;
    let net_benefit = total_benefits - inputs.solution_cost;
    let roi = roi_percent(net_benefit, inputs.solution_cost);

    let current_total_costs = inputs.manual_processing_cost
        + inputs.compliance_fines
        + inputs.training_costs
        + inputs.infrastructure_costs
        + annual_staff_cost;

    let projection = project_years(
        inputs.contract_years,
        total_cost_savings,
        total_revenue_gain,
        roi,
    );

    DerivedMetrics {
        annual_staff_cost,
        current_total_costs,
        total_customers,
        staff_cost_savings,
        compliance_savings,
        processing_cost_savings,
        training_savings,
        total_cost_savings,
        faster_processing_revenue,
        cross_sell_revenue,
        retention_revenue,
        nim_improvement,
        total_revenue_gain,
        total_benefits,
        net_benefit,
        roi_percent: roi,
        payback_months: payback_months(inputs.solution_cost, total_benefits),
        npv: net_present_value(
            inputs.implementation_cost,
            net_benefit,
            inputs.discount_rate,
            inputs.contract_years,
        ),
        cost_per_loan: ratio(
            inputs.solution_cost,
            inputs.new_loans_per_month * MONTHS_PER_YEAR,
        ),
        revenue_per_customer: ratio(total_revenue_gain, total_customers),
        efficiency_ratio: ratio(
            current_total_costs - total_cost_savings,
            inputs.annual_revenue,
        ),
        time_saved_per_loan: inputs.avg_loan_processing_days * inputs.process_time_reduction,
        time_saved_per_onboarding: inputs.customer_onboarding_days
            * inputs.onboarding_time_reduction,
        projection,
    }
}

pub fn net_present_value(
    implementation_cost: f64,
    net_benefit: f64,
    discount_rate: f64,
    years: u32,
) -> Metric {
    let mut npv = -implementation_cost;
    let mut discount = 1.0;
    for _ in 0..years.min(MAX_CONTRACT_YEARS) {
        discount *= 1.0 + discount_rate;
        npv += net_benefit / discount;
    }
    Metric::from_value(npv)
}

// Benefits are flat across years; only `cumulative` grows.
pub fn project_years(
    years: u32,
    cost_savings: f64,
    revenue_gains: f64,
    roi: Metric,
) -> Vec<ProjectionYear> {
    let total_benefits = cost_savings + revenue_gains;
    (1..=years.min(MAX_CONTRACT_YEARS))
        .map(|year| ProjectionYear {
            year,
            cost_savings,
            revenue_gains,
            total_benefits,
            cumulative: total_benefits * year as f64,
            roi,
        })
        .collect()
}

fn roi_percent(net_benefit: f64, solution_cost: f64) -> Metric {
    match ratio(net_benefit, solution_cost) {
        Metric::Defined(r) => Metric::from_value(js_round(r * 100.0)),
        Metric::Undefined => Metric::Undefined,
    }
}

fn payback_months(solution_cost: f64, total_benefits: f64) -> Metric {
    match ratio(solution_cost, total_benefits) {
        Metric::Defined(r) => Metric::from_value(js_round(r * MONTHS_PER_YEAR)),
        Metric::Undefined => Metric::Undefined,
    }
}

fn ratio(numerator: f64, denominator: f64) -> Metric {
    if denominator == 0.0 {
        return Metric::Undefined;
    }
    Metric::from_value(numerator / denominator)
}

fn js_round(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor >= 0.5 { floor + 1.0 } else { floor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_defined(metric: Metric, expected: f64) {
        match metric {
            Metric::Defined(v) => assert_approx(v, expected),
            Metric::Undefined => panic!("expected {expected}, got undefined"),
        }
    }

    fn zero_driver_inputs() -> Inputs {
        Inputs {
            institution_name: "Test Bank".to_string(),
            annual_revenue: 0.0,
            loan_portfolio_size: 0.0,
            deposit_volume: 0.0,
            branch_count: 0.0,
            retail_customers: 0.0,
            business_customers: 0.0,
            commercial_customers: 0.0,
            staff_hours_per_month: 0.0,
            hourly_rate: 0.0,
            manual_processing_cost: 0.0,
            compliance_fines: 0.0,
            training_costs: 0.0,
            infrastructure_costs: 0.0,
            avg_loan_processing_days: 0.0,
            customer_onboarding_days: 0.0,
            solution_cost: 0.0,
            implementation_cost: 0.0,
            contract_years: 0,
            discount_rate: 0.0,
            process_time_reduction: 0.0,
            onboarding_time_reduction: 0.0,
            staff_efficiency_gain: 0.0,
            compliance_risk_reduction: 0.0,
            customer_retention_improvement: 0.0,
            cross_sell_rate: 0.0,
            loan_margin: 0.0,
            new_loans_per_month: 0.0,
            avg_loan_value: 0.0,
        }
    }

    fn staff_only_inputs() -> Inputs {
        let mut inputs = zero_driver_inputs();
        inputs.annual_revenue = 50_000_000.0;
        inputs.staff_hours_per_month = 2_000.0;
        inputs.hourly_rate = 50.0;
        inputs.staff_efficiency_gain = 0.40;
        inputs.solution_cost = 300_000.0;
        inputs.contract_years = 3;
        inputs
    }

    #[test]
    fn staff_only_oracle_matches_hand_calculation() {
        let m = compute(&staff_only_inputs());

        assert_approx(m.annual_staff_cost, 1_200_000.0);
        assert_approx(m.staff_cost_savings, 480_000.0);
        assert_approx(m.total_cost_savings, 480_000.0);
        assert_approx(m.total_revenue_gain, 0.0);
        assert_approx(m.total_benefits, 480_000.0);
        assert_approx(m.net_benefit, 180_000.0);
        assert_defined(m.roi_percent, 60.0);
        assert_defined(m.payback_months, 8.0);
    }

    #[test]
    fn default_inputs_match_hand_calculation() {
        let m = compute(&Inputs::default());

        // Cost savings: 480,000 + 30,000 + 125,000 + 40,000
        assert_approx(m.staff_cost_savings, 480_000.0);
        assert_approx(m.compliance_savings, 30_000.0);
        assert_approx(m.processing_cost_savings, 125_000.0);
        assert_approx(m.training_savings, 40_000.0);
        assert_approx(m.total_cost_savings, 675_000.0);

        // Revenue: 100*12*0.5*0.4 = 240 loans * 50,000 * 0.03 = 360,000
        // Cross-sell: 28,500 * 0.05 * 150 = 213,750
        // Retention: 50,000,000 * 0.02 = 1,000,000
        // NIM: 250,000,000 * 0.002 = 500,000
        assert_approx(m.faster_processing_revenue, 360_000.0);
        assert_approx(m.cross_sell_revenue, 213_750.0);
        assert_approx(m.retention_revenue, 1_000_000.0);
        assert_approx(m.nim_improvement, 500_000.0);
        assert_approx(m.total_revenue_gain, 2_073_750.0);

        assert_approx(m.total_benefits, 2_748_750.0);
        assert_approx(m.net_benefit, 2_448_750.0);
        // 2,448,750 / 300,000 * 100 = 816.25
        assert_defined(m.roi_percent, 816.0);
        // 300,000 / 2,748,750 * 12 = 1.3097
        assert_defined(m.payback_months, 1.0);

        assert_approx(m.current_total_costs, 1_780_000.0);
        assert_defined(m.cost_per_loan, 250.0);
        assert_defined(m.revenue_per_customer, 2_073_750.0 / 28_500.0);
        assert_defined(m.efficiency_ratio, (1_780_000.0 - 675_000.0) / 50_000_000.0);
        assert_approx(m.time_saved_per_loan, 7.0);
        assert_approx(m.time_saved_per_onboarding, 3.0);
        assert_eq!(m.projection.len(), 3);
    }

    #[test]
    fn npv_discounts_each_year_and_subtracts_implementation() {
        // -100 + 110/1.1 = 0
        let npv = net_present_value(100.0, 110.0, 0.10, 1);
        assert_defined(npv, 0.0);

        let npv = net_present_value(100.0, 121.0, 0.10, 2);
        let expected = -100.0 + 121.0 / 1.1 + 121.0 / 1.21;
        assert_defined(npv, expected);
    }

    #[test]
    fn npv_with_zero_years_is_negative_implementation_cost() {
        assert_defined(net_present_value(150_000.0, 1_000_000.0, 0.08, 0), -150_000.0);
    }

    #[test]
    fn npv_with_minus_one_discount_rate_is_undefined() {
        assert_eq!(net_present_value(0.0, 10.0, -1.0, 2), Metric::Undefined);
    }

    #[test]
    fn projection_repeats_annual_totals_and_accumulates() {
        let rows = project_years(4, 10.0, 5.0, Metric::Defined(42.0));
        assert_eq!(rows.len(), 4);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.year, i as u32 + 1);
            assert_approx(row.cost_savings, 10.0);
            assert_approx(row.revenue_gains, 5.0);
            assert_approx(row.total_benefits, 15.0);
            assert_approx(row.cumulative, 15.0 * (i + 1) as f64);
            assert_eq!(row.roi, Metric::Defined(42.0));
        }
    }

    #[test]
    fn contract_years_beyond_limit_are_capped() {
        let mut inputs = Inputs::default();
        inputs.contract_years = u32::MAX;

        let m = compute(&inputs);
        assert_eq!(m.projection.len(), MAX_CONTRACT_YEARS as usize);
        assert_eq!(
            m.projection.last().map(|row| row.year),
            Some(MAX_CONTRACT_YEARS)
        );
        assert_eq!(
            m.npv,
            net_present_value(
                inputs.implementation_cost,
                m.net_benefit,
                inputs.discount_rate,
                MAX_CONTRACT_YEARS,
            )
        );
        assert!(m.npv.value().is_some_and(|npv| npv > 0.0));
    }

    #[test]
    fn simple_variant_matches_hand_calculation() {
        let mut inputs = zero_driver_inputs();
        inputs.annual_revenue = 50_000_000.0;
        inputs.solution_cost = 300_000.0;

        let m = compute_simple(&inputs);
        assert_approx(m.annual_savings, 1_000_000.0);
        assert_approx(m.net_benefit, 700_000.0);
        assert_defined(m.roi_percent, 233.0);
    }

    #[test]
    fn calculate_dispatches_on_mode() {
        let inputs = Inputs::default();
        match calculate(&inputs, CalculationMode::Simple) {
            Calculation::Simple(m) => assert_eq!(m, compute_simple(&inputs)),
            other => panic!("expected simple metrics, got {other:?}"),
        }
        match calculate(&inputs, CalculationMode::Full) {
            Calculation::Full(m) => assert_eq!(m, compute(&inputs)),
            other => panic!("expected full metrics, got {other:?}"),
        }
    }

    #[test]
    fn zero_solution_cost_leaves_roi_undefined() {
        let mut inputs = Inputs::default();
        inputs.solution_cost = 0.0;

        let m = compute(&inputs);
        assert_eq!(m.roi_percent, Metric::Undefined);
        assert!(m.projection.iter().all(|row| row.roi == Metric::Undefined));
        assert_defined(m.payback_months, 0.0);
        assert_eq!(compute_simple(&inputs).roi_percent, Metric::Undefined);
    }

    #[test]
    fn zero_denominators_are_undefined_not_infinite() {
        let m = compute(&zero_driver_inputs());
        assert_eq!(m.roi_percent, Metric::Undefined);
        assert_eq!(m.payback_months, Metric::Undefined);
        assert_eq!(m.cost_per_loan, Metric::Undefined);
        assert_eq!(m.revenue_per_customer, Metric::Undefined);
        assert_eq!(m.efficiency_ratio, Metric::Undefined);
        assert_defined(m.npv, 0.0);
        assert!(m.projection.is_empty());
    }

    #[test]
    fn negative_inputs_still_produce_metrics() {
        let mut inputs = Inputs::default();
        inputs.solution_cost = -300_000.0;
        inputs.hourly_rate = -50.0;
        inputs.staff_efficiency_gain = 1.5;

        let m = compute(&inputs);
        assert!(matches!(m.roi_percent, Metric::Defined(_)));
        assert!(m.total_benefits.is_finite());
    }

    #[test]
    fn js_round_sends_halves_up() {
        assert_approx(js_round(2.5), 3.0);
        assert_approx(js_round(-2.5), -2.0);
        assert_approx(js_round(-2.6), -3.0);
        assert_approx(js_round(233.333), 233.0);
        assert_approx(js_round(0.0), 0.0);
    }

    #[test]
    fn zeroing_each_fraction_removes_only_its_term() {
        let base = compute(&Inputs::default());

        let mut inputs = Inputs::default();
        inputs.staff_efficiency_gain = 0.0;
        let m = compute(&inputs);
        assert_approx(m.staff_cost_savings, 0.0);
        assert_approx(m.compliance_savings, base.compliance_savings);
        assert_approx(m.processing_cost_savings, base.processing_cost_savings);
        assert_approx(m.total_revenue_gain, base.total_revenue_gain);

        let mut inputs = Inputs::default();
        inputs.compliance_risk_reduction = 0.0;
        let m = compute(&inputs);
        assert_approx(m.compliance_savings, 0.0);
        assert_approx(m.staff_cost_savings, base.staff_cost_savings);
        assert_approx(m.total_revenue_gain, base.total_revenue_gain);

        let mut inputs = Inputs::default();
        inputs.customer_retention_improvement = 0.0;
        let m = compute(&inputs);
        assert_approx(m.retention_revenue, 0.0);
        assert_approx(m.cross_sell_revenue, base.cross_sell_revenue);
        assert_approx(m.total_cost_savings, base.total_cost_savings);

        let mut inputs = Inputs::default();
        inputs.cross_sell_rate = 0.0;
        let m = compute(&inputs);
        assert_approx(m.cross_sell_revenue, 0.0);
        assert_approx(m.retention_revenue, base.retention_revenue);
        assert_approx(m.total_cost_savings, base.total_cost_savings);

        let mut inputs = Inputs::default();
        inputs.loan_margin = 0.0;
        let m = compute(&inputs);
        assert_approx(m.faster_processing_revenue, 0.0);
        assert_approx(m.nim_improvement, base.nim_improvement);
        assert_approx(m.total_cost_savings, base.total_cost_savings);

        // Process-time reduction drives processing savings, loan revenue and
        // time saved per loan.
        let mut inputs = Inputs::default();
        inputs.process_time_reduction = 0.0;
        let m = compute(&inputs);
        assert_approx(m.processing_cost_savings, 0.0);
        assert_approx(m.faster_processing_revenue, 0.0);
        assert_approx(m.time_saved_per_loan, 0.0);
        assert_approx(m.staff_cost_savings, base.staff_cost_savings);
        assert_approx(m.cross_sell_revenue, base.cross_sell_revenue);

        let mut inputs = Inputs::default();
        inputs.onboarding_time_reduction = 0.0;
        let m = compute(&inputs);
        assert_approx(m.time_saved_per_onboarding, 0.0);
        assert_approx(m.total_benefits, base.total_benefits);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_roi_is_rounded_net_over_cost(
            staff_hours in 0u32..10_000,
            hourly_rate in 0u32..500,
            gain_bp in 0u32..10_001,
            revenue in 0u32..100_000_000,
            retention_bp in 0u32..1_001,
            solution_cost in 1u32..5_000_000
        ) {
            let mut inputs = Inputs::default();
            inputs.staff_hours_per_month = staff_hours as f64;
            inputs.hourly_rate = hourly_rate as f64;
            inputs.staff_efficiency_gain = gain_bp as f64 / 10_000.0;
            inputs.annual_revenue = revenue as f64;
            inputs.customer_retention_improvement = retention_bp as f64 / 10_000.0;
            inputs.solution_cost = solution_cost as f64;

            let m = compute(&inputs);
            prop_assert!(m.total_benefits > 0.0);
            let expected = js_round(
                (m.total_benefits - inputs.solution_cost) / inputs.solution_cost * 100.0,
            );
            prop_assert_eq!(m.roi_percent, Metric::Defined(expected));
        }

        #[test]
        fn prop_payback_round_trips_to_total_benefits(
            revenue in 1_000_000u32..200_000_000,
            solution_cost in 1_000u32..5_000_000
        ) {
            let mut inputs = Inputs::default();
            inputs.annual_revenue = revenue as f64;
            inputs.solution_cost = solution_cost as f64;

            let m = compute(&inputs);
            let months = m.payback_months.value().unwrap_or(f64::NAN);
            let exact = inputs.solution_cost / m.total_benefits * 12.0;
            prop_assert!((months - exact).abs() <= 0.5 + EPS);
            // Reconstructing benefits from whole months is off by at most half
            // a month of cost.
            if months > 0.0 {
                let reconstructed = inputs.solution_cost * 12.0 / months;
                let implied = inputs.solution_cost * 12.0 / exact;
                prop_assert!((reconstructed - implied).abs() / implied <= 0.5 / months + EPS);
            }
        }

        #[test]
        fn prop_cumulative_grows_linearly(
            years in 0u32..40,
            staff_hours in 0u32..10_000
        ) {
            let mut inputs = Inputs::default();
            inputs.contract_years = years;
            inputs.staff_hours_per_month = staff_hours as f64;

            let m = compute(&inputs);
            prop_assert_eq!(m.projection.len(), years as usize);
            for (i, row) in m.projection.iter().enumerate() {
                let expected = m.total_benefits * (i + 1) as f64;
                prop_assert!((row.cumulative - expected).abs() <= EPS * expected.abs().max(1.0));
                prop_assert!((row.total_benefits - m.total_benefits).abs() <= EPS);
            }
        }

        #[test]
        fn prop_undiscounted_npv_is_net_benefit_times_years(
            years in 0u32..30,
            implementation in 0u32..2_000_000,
            solution_cost in 0u32..5_000_000
        ) {
            let mut inputs = Inputs::default();
            inputs.discount_rate = 0.0;
            inputs.contract_years = years;
            inputs.implementation_cost = implementation as f64;
            inputs.solution_cost = solution_cost as f64;

            let m = compute(&inputs);
            let expected = -inputs.implementation_cost + m.net_benefit * years as f64;
            let npv = m.npv.value().unwrap_or(f64::NAN);
            prop_assert!((npv - expected).abs() <= 1e-6 * expected.abs().max(1.0));
        }
    }
}
