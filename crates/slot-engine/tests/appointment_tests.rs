//! Tests for appointment ingestion, wall-clock parsing and patches.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use slot_engine::appointment::{parse_appointments, AppointmentPatch, AppointmentStatus};
use slot_engine::clock::{format_wall_clock, parse_wall_clock};
use slot_engine::SlotError;

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

const ONE_RECORD: &str = r#"[{
    "id": "1",
    "clientId": "client1",
    "clientName": "João Silva",
    "clientPhone": "(11) 99999-9999",
    "clientEmail": "joao@email.com",
    "barberId": "barber1",
    "barberName": "João Barbearia",
    "service": "Corte + Barba",
    "date": "2024-06-10",
    "startTime": "14:00",
    "duration": 60,
    "price": 40,
    "status": "confirmed",
    "notes": "Primeiro agendamento"
}]"#;

// ── Wall-clock parsing ──────────────────────────────────────────────────────

#[test]
fn parses_valid_wall_clock_times() {
    assert_eq!(parse_wall_clock("00:00").unwrap(), hm(0, 0));
    assert_eq!(parse_wall_clock("09:05").unwrap(), hm(9, 5));
    assert_eq!(parse_wall_clock("23:59").unwrap(), hm(23, 59));
}

#[test]
fn rejects_malformed_wall_clock_times() {
    for bad in [
        "", "9:05", "24:00", "12:60", "ab:cd", "12:5", "12:345", "12-30", " 12:30", "12:30:00",
        "+1:30",
    ] {
        let err = parse_wall_clock(bad).unwrap_err();
        assert!(
            matches!(err, SlotError::InvalidTime(ref s) if s == bad),
            "{:?} should be rejected, got {:?}",
            bad,
            err
        );
    }
}

#[test]
fn formats_without_seconds() {
    let t = NaiveTime::from_hms_opt(7, 5, 42).unwrap();
    assert_eq!(format_wall_clock(t), "07:05");
}

// ── Ingestion ───────────────────────────────────────────────────────────────

#[test]
fn parses_full_record() {
    let appts = parse_appointments(ONE_RECORD).unwrap();
    assert_eq!(appts.len(), 1);

    let a = &appts[0];
    assert_eq!(a.id, "1");
    assert_eq!(a.barber_id, "barber1");
    assert_eq!(a.date, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    assert_eq!(a.start_time, hm(14, 0));
    assert_eq!(a.duration, 60);
    assert_eq!(a.status, AppointmentStatus::Confirmed);
    assert_eq!(a.client_email.as_deref(), Some("joao@email.com"));
    assert_eq!(a.end_time().unwrap(), hm(15, 0));
}

#[test]
fn minimal_record_gets_defaults() {
    let appts = parse_appointments(
        r#"[{"id":"a","barberId":"b","date":"2024-06-10","startTime":"08:00","duration":30}]"#,
    )
    .unwrap();
    assert_eq!(appts[0].status, AppointmentStatus::Pending);
    assert_eq!(appts[0].client_name, "");
    assert_eq!(appts[0].price, 0.0);
}

#[test]
fn every_status_spelling_decodes() {
    let cases = [
        ("pending", AppointmentStatus::Pending),
        ("confirmed", AppointmentStatus::Confirmed),
        ("completed", AppointmentStatus::Completed),
        ("cancelled", AppointmentStatus::Cancelled),
        ("no-show", AppointmentStatus::NoShow),
    ];
    for (raw, expected) in cases {
        let json = format!(
            r#"[{{"id":"a","barberId":"b","date":"2024-06-10","startTime":"08:00","duration":30,"status":"{}"}}]"#,
            raw
        );
        assert_eq!(parse_appointments(&json).unwrap()[0].status, expected);
    }
}

#[test]
fn malformed_start_time_is_rejected_at_ingestion() {
    let json = r#"[{"id":"a","barberId":"b","date":"2024-06-10","startTime":"25:00","duration":30}]"#;
    let err = parse_appointments(json).unwrap_err();
    assert!(matches!(err, SlotError::Json(_)), "got {:?}", err);
    assert!(err.to_string().contains("25:00"));
}

#[test]
fn zero_duration_is_rejected() {
    let json = r#"[{"id":"a","barberId":"b","date":"2024-06-10","startTime":"10:00","duration":0}]"#;
    let err = parse_appointments(json).unwrap_err();
    assert!(
        matches!(err, SlotError::InvalidAppointment { ref id, .. } if id == "a"),
        "got {:?}",
        err
    );
}

#[test]
fn negative_duration_fails_to_decode() {
    let json = r#"[{"id":"a","barberId":"b","date":"2024-06-10","startTime":"10:00","duration":-30}]"#;
    assert!(matches!(parse_appointments(json), Err(SlotError::Json(_))));
}

#[test]
fn blank_barber_id_is_rejected() {
    let json = r#"[{"id":"a","barberId":" ","date":"2024-06-10","startTime":"10:00","duration":30}]"#;
    assert!(matches!(
        parse_appointments(json),
        Err(SlotError::InvalidAppointment { .. })
    ));
}

#[test]
fn unknown_status_fails_to_decode() {
    let json = r#"[{"id":"a","barberId":"b","date":"2024-06-10","startTime":"10:00","duration":30,"status":"scheduled"}]"#;
    assert!(matches!(parse_appointments(json), Err(SlotError::Json(_))));
}

#[test]
fn end_time_wraps_past_midnight() {
    let json = r#"[{"id":"a","barberId":"b","date":"2024-06-10","startTime":"23:30","duration":60}]"#;
    let appts = parse_appointments(json).unwrap();
    assert_eq!(appts[0].end_time().unwrap(), hm(0, 30));

    let (start, end) = appts[0].occupied_window().unwrap();
    assert_eq!(start.date(), NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    assert_eq!(end.date(), NaiveDate::from_ymd_opt(2024, 6, 11).unwrap());
}

#[test]
fn window_ending_past_the_last_date_is_rejected() {
    let json = r#"[{"id":"edge","barberId":"b","date":"+262142-12-31","startTime":"23:30","duration":60}]"#;
    let err = parse_appointments(json).unwrap_err();
    assert!(
        matches!(err, SlotError::InvalidAppointment { ref id, .. } if id == "edge"),
        "unexpected error: {:?}",
        err
    );

    // The same day is fine when the window stays inside it.
    let json = r#"[{"id":"edge","barberId":"b","date":"+262142-12-31","startTime":"22:00","duration":60}]"#;
    assert_eq!(parse_appointments(json).unwrap().len(), 1);
}

#[test]
fn serializes_derived_end_time() {
    let appt = parse_appointments(ONE_RECORD).unwrap().remove(0);
    let json = serde_json::to_value(&appt).unwrap();

    assert_eq!(json["startTime"], "14:00");
    assert_eq!(json["endTime"], "15:00");
    assert_eq!(json["barberId"], "barber1");
    assert!(json.get("clientNotes").is_none());
}

#[test]
fn incoming_end_time_is_recomputed() {
    let json = r#"[{"id":"a","barberId":"b","date":"2024-06-10","startTime":"10:00","endTime":"12:00","duration":30}]"#;
    let appt = parse_appointments(json).unwrap().remove(0);
    assert_eq!(appt.end_time().unwrap(), hm(10, 30));

    let out = serde_json::to_value(&appt).unwrap();
    assert_eq!(out["endTime"], "10:30");
}

// ── Patches ─────────────────────────────────────────────────────────────────

#[test]
fn patch_updates_only_given_fields() {
    let mut appt = parse_appointments(ONE_RECORD).unwrap().remove(0);
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

    let patch = AppointmentPatch {
        start_time: Some(hm(15, 30)),
        notes: Some("moved".to_string()),
        ..Default::default()
    };
    patch.apply(&mut appt, now).unwrap();

    assert_eq!(appt.start_time, hm(15, 30));
    assert_eq!(appt.notes.as_deref(), Some("moved"));
    assert_eq!(appt.status, AppointmentStatus::Confirmed);
    assert_eq!(appt.duration, 60);
    assert_eq!(appt.updated_at, Some(now));
}

#[test]
fn patch_with_zero_duration_leaves_appointment_unchanged() {
    let mut appt = parse_appointments(ONE_RECORD).unwrap().remove(0);
    let before = appt.clone();

    let patch = AppointmentPatch {
        duration: Some(0),
        status: Some(AppointmentStatus::Cancelled),
        ..Default::default()
    };
    assert!(patch.apply(&mut appt, Utc::now()).is_err());
    assert_eq!(appt, before);
}

#[test]
fn patch_moving_window_out_of_range_leaves_appointment_unchanged() {
    let mut appt = parse_appointments(ONE_RECORD).unwrap().remove(0);
    let before = appt.clone();

    let patch = AppointmentPatch {
        date: Some(NaiveDate::MAX),
        start_time: Some(hm(23, 30)),
        ..Default::default()
    };
    let err = patch.apply(&mut appt, Utc::now()).unwrap_err();
    assert!(matches!(err, SlotError::InvalidAppointment { .. }));
    assert_eq!(appt, before);
}

#[test]
fn patch_decodes_from_camel_case_json() {
    let patch: AppointmentPatch =
        serde_json::from_str(r#"{"status":"no-show","startTime":"10:30"}"#).unwrap();
    assert_eq!(patch.status, Some(AppointmentStatus::NoShow));
    assert_eq!(patch.start_time, Some(hm(10, 30)));
    assert_eq!(patch.duration, None);

    let bad: Result<AppointmentPatch, _> = serde_json::from_str(r#"{"startTime":"10h30"}"#);
    assert!(bad.is_err());
}
