//! Sample collections shared by the tests.

use serde_json::json;

use crate::{
    pipeline::{Collection, Record},
    session::Session,
};

fn collection_from_json(value: serde_json::Value) -> Collection {
    serde_json::from_value(value).expect("Could not parse sample collection")
}

/// Three disputes with amounts 100.50, 200.75 and 50.25, as served by the
/// backend.
pub(crate) fn sample_disputes_json() -> serde_json::Value {
    json!([
        {
            "id": 1,
            "reportId": "REP001",
            "phoneReporter": "555-0101",
            "phoneReportee": "555-0102",
            "email": "rep1@example.com",
            "disputeAmount": 100.5,
            "created": "2024-12-03T01:30:00Z",
            "status": "Needs response",
            "reviewed": false,
            "resolved": false
        },
        {
            "id": 2,
            "reportId": "REP002",
            "phoneReporter": "555-0202",
            "phoneReportee": "555-0203",
            "email": "rep2@example.com",
            "disputeAmount": 200.75,
            "created": "2024-11-29T02:39:00Z",
            "status": "In review",
            "reviewed": true,
            "resolved": false
        },
        {
            "id": 3,
            "reportId": "REP003",
            "phoneReporter": "555-0303",
            "phoneReportee": "555-0304",
            "email": "rep3@example.com",
            "disputeAmount": 50.25,
            "created": "2024-11-22T00:49:00Z",
            "status": "Needs response",
            "reviewed": true,
            "resolved": true
        }
    ])
}

pub(crate) fn sample_disputes() -> Collection {
    collection_from_json(sample_disputes_json())
}

pub(crate) fn sample_businesses_json() -> serde_json::Value {
    json!([
        {
            "id": 7,
            "businessName": "Abebe Coffee",
            "registrationId": "BR-0007",
            "contactEmail": "owner@abebe.example",
            "totalRevenue": "15230.40",
            "createdAt": "2025-01-14T09:12:00Z",
            "verificationStatus": "pending"
        },
        {
            "id": 8,
            "businessName": "Lalibela Tours",
            "registrationId": "BR-0008",
            "contactEmail": "info@lalibela.example",
            "totalRevenue": "9800.00",
            "createdAt": "2025-02-02T14:45:00Z",
            "verificationStatus": "approved"
        }
    ])
}

pub(crate) fn sample_businesses() -> Collection {
    collection_from_json(sample_businesses_json())
}

pub(crate) fn sample_business() -> Record {
    sample_businesses()
        .into_iter()
        .next()
        .expect("Sample businesses should not be empty")
}

pub(crate) fn test_session() -> Session {
    Session::new("access-token", Some("refresh-token".to_owned()))
}
