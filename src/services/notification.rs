use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use crate::database::models::{Payment, PendingBalance};

/// Delivery seam for WhatsApp/email summaries. The engine only builds the
/// message text; whatever implements this owns transport, retries and
/// credentials. Senders are always invoked fire-and-forget — a delivery
/// failure is logged and never fails the payroll operation that produced
/// the summary.
pub trait NotificationSender: Send + Sync {
    fn deliver(&self, phone: &str, message: &str) -> anyhow::Result<()>;
}

/// Default sender: logs the message instead of delivering it.
pub struct LogOnlySender;

impl NotificationSender for LogOnlySender {
    fn deliver(&self, phone: &str, message: &str) -> anyhow::Result<()> {
        log::info!("Notification for {} (not delivered):\n{}", phone, message);
        Ok(())
    }
}

/// One rendered day inside a summary message.
#[derive(Debug, Clone)]
pub struct DayLine {
    pub date: NaiveDate,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub hours: f64,
    pub is_double_day: bool,
    pub deduction_hours: f64,
    pub net: f64,
}

/// Summary sent after a batch of hour registrations for one employee.
pub fn batch_summary(
    employee_name: &str,
    lines: &[DayLine],
    total_hours: f64,
    total_net: f64,
) -> String {
    let mut detail = String::new();
    for line in lines {
        detail.push_str(&format!(
            "• {} {}: {} - {} {}\n",
            weekday_abbrev(line.date),
            line.date,
            fmt_time(line.time_in),
            fmt_time(line.time_out),
            line_tags(line),
        ));
    }

    format!(
        "*REGISTRO DE HORAS*\n\n*Empleado:* {}\n*Total Horas:* {:.1}h\n*Monto Est.:* {}\n\n*DETALLE:*\n{}",
        employee_name,
        total_hours,
        colones(total_net),
        detail,
    )
}

/// Pending-balance summary, day by day, oldest first.
pub fn pending_summary(balance: &PendingBalance) -> String {
    let mut lines: Vec<&crate::database::models::PendingLine> = balance.lines.iter().collect();
    lines.sort_by_key(|l| l.date);

    let mut detail = String::new();
    if !lines.is_empty() {
        detail.push_str("\n\n*DETALLE DE DÍAS:*\n");
        for line in lines {
            detail.push_str(&format!(
                "• {} {}: {} - {} ({:.1}h) → {}\n",
                weekday_abbrev(line.date),
                line.date,
                fmt_time(line.time_in),
                fmt_time(line.time_out),
                line.hours,
                colones(line.net),
            ));
        }
    }

    format!(
        "*RESUMEN DE PAGO*\n\n*Empleado:* {}\n*Total Neto:* {}\n*Total Horas:* {:.1}h{}",
        balance.name,
        colones(balance.net),
        balance.hours,
        detail,
    )
}

/// Receipt for a single settled or registered day.
pub fn line_receipt(
    employee_name: &str,
    date: NaiveDate,
    time_in: Option<NaiveTime>,
    time_out: Option<NaiveTime>,
    hours: f64,
    net: f64,
) -> String {
    format!(
        "*REGISTRO*\n\n*Emp:* {}\n*Día:* {} {}\n*Horario:* {} - {}\n*Horas:* {:.1}h\n*Monto:* {}",
        employee_name,
        weekday_abbrev(date),
        date,
        fmt_time(time_in),
        fmt_time(time_out),
        hours,
        colones(net),
    )
}

/// Receipt for a settled payment, built from its immutable snapshot.
pub fn settlement_receipt(employee_name: &str, payment: &Payment) -> String {
    let span = match (payment.start_date, payment.end_date) {
        (Some(start), Some(end)) => format!("\n*Periodo:* {} a {}", start, end),
        _ => String::new(),
    };

    format!(
        "*PAGO REALIZADO*\n\n*Empleado:* {}\n*Fecha:* {}\n*Horas:* {:.1}h\n*Neto:* {}{}",
        employee_name,
        payment.date,
        payment.hours,
        colones(payment.net_amount),
        span,
    )
}

fn line_tags(line: &DayLine) -> String {
    let mut info = format!("({:.1}h)", line.hours);
    if line.is_double_day {
        info.push_str(" [DOBLE]");
    }
    if line.deduction_hours > 0.0 {
        info.push_str(&format!(" [-{}h almuerzo]", line.deduction_hours));
    }
    info.push_str(&format!(" → {}", colones(line.net)));
    info
}

fn fmt_time(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--".to_string())
}

/// Rounded colón amount with thousands separators, e.g. `₡12,500`.
pub fn colones(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if rounded < 0 {
        format!("-₡{}", out)
    } else {
        format!("₡{}", out)
    }
}

fn weekday_abbrev(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "LUN",
        Weekday::Tue => "MAR",
        Weekday::Wed => "MIE",
        Weekday::Thu => "JUE",
        Weekday::Fri => "VIE",
        Weekday::Sat => "SAB",
        Weekday::Sun => "DOM",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn colones_formats_thousands() {
        assert_eq!(colones(0.0), "₡0");
        assert_eq!(colones(950.4), "₡950");
        assert_eq!(colones(12500.0), "₡12,500");
        assert_eq!(colones(1234567.49), "₡1,234,567");
        assert_eq!(colones(-8000.0), "-₡8,000");
    }

    #[test]
    fn batch_summary_lists_each_day_with_tags() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(); // a Monday
        let lines = vec![
            DayLine {
                date,
                time_in: t(8, 0),
                time_out: t(17, 0),
                hours: 9.0,
                is_double_day: false,
                deduction_hours: 1.0,
                net: 18000.0,
            },
            DayLine {
                date: date.succ_opt().unwrap(),
                time_in: t(8, 0),
                time_out: t(12, 0),
                hours: 8.0,
                is_double_day: true,
                deduction_hours: 0.0,
                net: 16000.0,
            },
        ];

        let message = batch_summary("Ana Mora", &lines, 17.0, 34000.0);

        assert!(message.contains("*Empleado:* Ana Mora"));
        assert!(message.contains("*Total Horas:* 17.0h"));
        assert!(message.contains("*Monto Est.:* ₡34,000"));
        assert!(message.contains("• LUN 2024-07-01: 08:00 - 17:00 (9.0h) [-1h almuerzo]"));
        assert!(message.contains("[DOBLE]"));
    }

    #[test]
    fn line_receipt_handles_missing_times() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 6).unwrap(); // a Saturday
        let message = line_receipt("Luis", date, None, None, 4.0, 7000.0);

        assert!(message.contains("*Día:* SAB 2024-07-06"));
        assert!(message.contains("*Horario:* -- - --"));
        assert!(message.contains("*Monto:* ₡7,000"));
    }
}
