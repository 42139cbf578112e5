#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use fake::Fake;
    use fake::faker::name::en::Name;
    use pretty_assertions::assert_eq;
    use sqlx::types::Json;
    use uuid::Uuid;

    use crate::database::models::{CycleType, Employee, EmployeeStatus, LogSource, TimeLog};
    use crate::services::payroll::{CCSS_RATE, aggregate_pending};

    fn employee(name: &str, rate: f64) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            name: name.to_string(),
            cedula: None,
            phone: None,
            pin: None,
            position: None,
            hourly_rate: rate,
            status: EmployeeStatus::Active,
            apply_ccss: false,
            overtime_threshold: 48.0,
            overtime_multiplier: 1.5,
            enable_overtime: true,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: None,
            salary_history: Json(Vec::new()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn log(employee: &Employee, day: u32, hours: f64) -> TimeLog {
        TimeLog {
            id: Uuid::new_v4(),
            business_id: employee.business_id,
            employee_id: employee.id,
            date: NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
            time_in: None,
            time_out: None,
            is_double_day: false,
            deduction_hours: 0.0,
            hours,
            is_paid: false,
            source: LogSource::Manual,
            location: None,
            photo_url: None,
            created_at: Utc::now(),
        }
    }

    fn double_log(employee: &Employee, day: u32, hours: f64) -> TimeLog {
        TimeLog {
            is_double_day: true,
            ..log(employee, day, hours)
        }
    }

    #[test]
    fn ccss_deduction_follows_the_statutory_constant() {
        let mut emp = employee("Rosa Vindas", 1000.0);
        emp.apply_ccss = true;
        let logs = vec![log(&emp, 1, 10.0)];

        let pending = aggregate_pending(&logs, &[emp.clone()], CycleType::Weekly);
        let balance = &pending[&emp.id];

        assert_eq!(balance.gross, 10000.0);
        assert_eq!(balance.deduction, 1067.0);
        assert_eq!(balance.net, 10000.0 - 10000.0 * CCSS_RATE);
        assert_eq!(balance.net, 8933.0);
    }

    #[test]
    fn no_ccss_deduction_without_the_opt_in() {
        let emp = employee("Rosa Vindas", 1000.0);
        let logs = vec![log(&emp, 1, 10.0)];

        let pending = aggregate_pending(&logs, &[emp.clone()], CycleType::Weekly);
        let balance = &pending[&emp.id];

        assert_eq!(balance.deduction, 0.0);
        assert_eq!(balance.net, balance.gross);
    }

    #[test]
    fn extra_hours_do_not_raise_aggregate_net() {
        // 50 regular hours over a 48h weekly threshold: the summary reports
        // 2 extra hours, but the net stays the flat per-log sum. The overtime
        // premium is intentionally NOT applied to the aggregate total; this
        // test pins that behavior so an accidental change is caught.
        let emp = employee("Marco Brenes", 2000.0);
        let logs = vec![
            log(&emp, 1, 10.0),
            log(&emp, 2, 10.0),
            log(&emp, 3, 10.0),
            log(&emp, 4, 10.0),
            log(&emp, 5, 10.0),
        ];

        let pending = aggregate_pending(&logs, &[emp.clone()], CycleType::Weekly);
        let balance = &pending[&emp.id];

        assert_eq!(balance.regular_hours, 50.0);
        assert_eq!(balance.extra_hours, 2.0);
        assert_eq!(balance.net, 50.0 * 2000.0);
        assert!(balance.net < 48.0 * 2000.0 + 2.0 * 2000.0 * 1.5);
    }

    #[test]
    fn extra_hours_zero_when_overtime_disabled() {
        let mut emp = employee("Marco Brenes", 2000.0);
        emp.enable_overtime = false;
        let logs = vec![log(&emp, 1, 30.0), log(&emp, 2, 30.0)];

        let pending = aggregate_pending(&logs, &[emp.clone()], CycleType::Weekly);
        assert_eq!(pending[&emp.id].extra_hours, 0.0);
    }

    #[test]
    fn cycle_policy_scales_the_overtime_threshold() {
        let emp = employee("Laura Chaves", 1500.0);
        let logs: Vec<TimeLog> = (1..=10).map(|d| log(&emp, d, 10.0)).collect(); // 100h regular

        let weekly = aggregate_pending(&logs, &[emp.clone()], CycleType::Weekly);
        assert_eq!(weekly[&emp.id].extra_hours, 100.0 - 48.0);

        let biweekly = aggregate_pending(&logs, &[emp.clone()], CycleType::Biweekly);
        assert_eq!(biweekly[&emp.id].extra_hours, 100.0 - 96.0);

        // Monthly is a nominal 4-week block: 4 × 48 = 192h, never reached here
        let monthly = aggregate_pending(&logs, &[emp.clone()], CycleType::Monthly);
        assert_eq!(monthly[&emp.id].extra_hours, 0.0);
    }

    #[test]
    fn double_day_hours_accumulate_separately_from_overtime() {
        let emp = employee("Pedro Solis", 1000.0);
        let logs = vec![
            log(&emp, 1, 40.0),
            double_log(&emp, 2, 16.0), // already doubled by the calculator
        ];

        let pending = aggregate_pending(&logs, &[emp.clone()], CycleType::Weekly);
        let balance = &pending[&emp.id];

        assert_eq!(balance.regular_hours, 40.0);
        assert_eq!(balance.double_hours, 16.0);
        // double hours never push the regular total over the threshold
        assert_eq!(balance.extra_hours, 0.0);
        assert_eq!(balance.hours, 56.0);
        assert_eq!(balance.net, 56.0 * 1000.0);
    }

    #[test]
    fn orphaned_logs_are_skipped_not_fatal() {
        let emp = employee("Sofia Rojas", 1200.0);
        let ghost = employee("Ghost", 9999.0);
        let logs = vec![log(&emp, 1, 8.0), log(&ghost, 1, 8.0)];

        // ghost is not in the employee snapshot
        let pending = aggregate_pending(&logs, &[emp.clone()], CycleType::Weekly);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[&emp.id].hours, 8.0);
    }

    #[test]
    fn paid_logs_never_contribute() {
        let emp = employee("Sofia Rojas", 1200.0);
        let mut paid = log(&emp, 1, 8.0);
        paid.is_paid = true;
        let logs = vec![paid, log(&emp, 2, 4.0)];

        let pending = aggregate_pending(&logs, &[emp.clone()], CycleType::Weekly);
        assert_eq!(pending[&emp.id].hours, 4.0);
        assert_eq!(pending[&emp.id].lines.len(), 1);
    }

    #[test]
    fn period_span_is_min_and_max_of_contributing_dates() {
        let emp = employee("Karla Mena", 1000.0);
        let logs = vec![log(&emp, 15, 8.0), log(&emp, 3, 8.0), log(&emp, 9, 8.0)];

        let pending = aggregate_pending(&logs, &[emp.clone()], CycleType::Weekly);
        let balance = &pending[&emp.id];

        assert_eq!(balance.start_date, NaiveDate::from_ymd_opt(2024, 7, 3).unwrap());
        assert_eq!(balance.end_date, NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
    }

    #[test]
    fn aggregation_is_insertion_order_independent() {
        let mut employees = Vec::new();
        let mut logs = Vec::new();
        for i in 0..5 {
            let mut emp = employee(&Name().fake::<String>(), 800.0 + 250.0 * i as f64);
            emp.apply_ccss = i % 2 == 0;
            for day in 1..=12 {
                logs.push(log(&emp, day, 4.5 + (day % 3) as f64 * 2.0));
                if day % 4 == 0 {
                    logs.push(double_log(&emp, day, 6.0));
                }
            }
            employees.push(emp);
        }

        let baseline = aggregate_pending(&logs, &employees, CycleType::Weekly);

        let mut reversed = logs.clone();
        reversed.reverse();
        let mut rotated = logs.clone();
        rotated.rotate_left(logs.len() / 3);

        for permuted in [reversed, rotated] {
            let result = aggregate_pending(&permuted, &employees, CycleType::Weekly);
            assert_eq!(result.len(), baseline.len());
            for (id, expected) in &baseline {
                let got = &result[id];
                assert_eq!(got.hours, expected.hours);
                assert_eq!(got.regular_hours, expected.regular_hours);
                assert_eq!(got.extra_hours, expected.extra_hours);
                assert_eq!(got.double_hours, expected.double_hours);
                assert_eq!(got.gross, expected.gross);
                // CCSS products are not exactly representable, so permuted
                // summation may differ in the last ulp; anything beyond that
                // is a real ordering bug.
                assert!((got.deduction - expected.deduction).abs() < 1e-6);
                assert!((got.net - expected.net).abs() < 1e-6);
                assert_eq!(got.start_date, expected.start_date);
                assert_eq!(got.end_date, expected.end_date);
                assert_eq!(got.lines.len(), expected.lines.len());
            }
        }
    }

    #[test]
    fn employees_without_unpaid_logs_do_not_appear() {
        let working = employee("Con Horas", 1000.0);
        let idle = employee("Sin Horas", 1000.0);
        let logs = vec![log(&working, 1, 8.0)];

        let pending = aggregate_pending(&logs, &[working.clone(), idle.clone()], CycleType::Weekly);

        assert!(pending.contains_key(&working.id));
        assert!(!pending.contains_key(&idle.id));
    }
}
