//! End-to-end exercises of the pure payroll pipeline: wall-clock times run
//! through the hours calculator, into time logs, through aggregation, and
//! out as notification summaries. Everything here operates on the snapshot
//! types the engine hands around; no storage is involved.

use chrono::{NaiveDate, NaiveTime, Utc};
use pretty_assertions::assert_eq;
use sqlx::types::Json;
use uuid::Uuid;

use planilla_be::database::models::{
    CycleType, Employee, EmployeeStatus, LogSource, TimeLog,
};
use planilla_be::services::hours::{payable_hours, round2};
use planilla_be::services::notification;
use planilla_be::services::payroll::{CCSS_RATE, aggregate_pending};

fn t(h: u32, m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
}

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
}

fn employee(name: &str, rate: f64, apply_ccss: bool) -> Employee {
    Employee {
        id: Uuid::new_v4(),
        business_id: Uuid::new_v4(),
        name: name.to_string(),
        cedula: None,
        phone: Some("50688880000".to_string()),
        pin: None,
        position: None,
        hourly_rate: rate,
        status: EmployeeStatus::Active,
        apply_ccss,
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

/// Builds a log the way the time-entry path does: payable hours derived from
/// the clock times and rounded at the persistence boundary.
fn clocked_log(
    employee: &Employee,
    day: u32,
    time_in: Option<NaiveTime>,
    time_out: Option<NaiveTime>,
    deduction: f64,
    double: bool,
) -> TimeLog {
    TimeLog {
        id: Uuid::new_v4(),
        business_id: employee.business_id,
        employee_id: employee.id,
        date: d(day),
        time_in,
        time_out,
        is_double_day: double,
        deduction_hours: deduction,
        hours: round2(payable_hours(time_in, time_out, deduction, double)),
        is_paid: false,
        source: LogSource::Manual,
        location: None,
        photo_url: None,
        created_at: Utc::now(),
    }
}

#[test]
fn clock_times_flow_into_an_aggregated_balance() {
    let emp = employee("Diego Salas", 2000.0, true);
    let logs = vec![
        // 8h day with an hour of lunch
        clocked_log(&emp, 1, t(8, 0), t(17, 0), 1.0, false),
        // 8h overnight shift
        clocked_log(&emp, 2, t(22, 0), t(6, 0), 0.0, false),
        // holiday: 4h clocked, doubled to 8h payable
        clocked_log(&emp, 3, t(8, 0), t(12, 0), 0.0, true),
        // lone clock-in, contributes nothing
        clocked_log(&emp, 4, t(8, 0), None, 0.0, false),
    ];

    let pending = aggregate_pending(&logs, &[emp.clone()], CycleType::Weekly);
    let balance = &pending[&emp.id];

    assert_eq!(balance.hours, 24.0);
    assert_eq!(balance.regular_hours, 16.0);
    assert_eq!(balance.double_hours, 8.0);
    assert_eq!(balance.extra_hours, 0.0);

    let expected_gross = 24.0 * 2000.0;
    assert_eq!(balance.gross, expected_gross);
    assert!((balance.deduction - expected_gross * CCSS_RATE).abs() < 1e-9);
    assert!((balance.net - (expected_gross - expected_gross * CCSS_RATE)).abs() < 1e-9);

    // the zero-hour clock event still appears in the drill-down
    assert_eq!(balance.lines.len(), 4);
    assert_eq!(balance.start_date, d(1));
    assert_eq!(balance.end_date, d(4));

    // per-line details sum back to the aggregate totals
    let line_hours: f64 = balance.lines.iter().map(|l| l.hours).sum();
    let line_net: f64 = balance.lines.iter().map(|l| l.net).sum();
    assert_eq!(line_hours, balance.hours);
    assert!((line_net - balance.net).abs() < 1e-9);
}

#[test]
fn fifty_hour_week_reports_extras_but_pays_flat() {
    // ₡2000/h, 48h weekly threshold, 50 regular hours: two extra hours show
    // up in the summary, while the payable net remains the flat per-log sum.
    let emp = employee("Marta Quiros", 2000.0, false);
    let logs: Vec<TimeLog> = (1..=5)
        .map(|day| clocked_log(&emp, day, t(7, 0), t(17, 0), 0.0, false))
        .collect();

    let pending = aggregate_pending(&logs, &[emp.clone()], CycleType::Weekly);
    let balance = &pending[&emp.id];

    assert_eq!(balance.regular_hours, 50.0);
    assert_eq!(balance.extra_hours, 2.0);
    assert_eq!(balance.net, 100000.0);

    // the same hours under a biweekly cycle are all below threshold
    let biweekly = aggregate_pending(&logs, &[emp.clone()], CycleType::Biweekly);
    assert_eq!(biweekly[&emp.id].extra_hours, 0.0);
    assert_eq!(biweekly[&emp.id].net, 100000.0);
}

#[test]
fn pending_summary_message_reflects_the_balance() {
    let emp = employee("Elena Castro", 1500.0, false);
    let logs = vec![
        clocked_log(&emp, 2, t(8, 0), t(16, 0), 0.0, false),
        clocked_log(&emp, 1, t(8, 0), t(12, 0), 0.0, false),
    ];

    let pending = aggregate_pending(&logs, &[emp.clone()], CycleType::Weekly);
    let message = notification::pending_summary(&pending[&emp.id]);

    assert!(message.contains("*Empleado:* Elena Castro"));
    assert!(message.contains("*Total Horas:* 12.0h"));
    assert!(message.contains("*Total Neto:* ₡18,000"));
    // detail is listed oldest day first
    let first = message.find("2024-07-01").unwrap();
    let second = message.find("2024-07-02").unwrap();
    assert!(first < second);
}
