use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use decomm_core::model::{
    Circuit, CommentRecord, HistoryEvent, HistoryEventKind, DECISION_KEEP_ACTIVE,
};
use decomm_core::types::{
    CircuitStatus, ContractStatus, HardwareEol, ProviderStatus, Redundancy, ServiceType,
    SiteStatus,
};

const BANDWIDTHS: [u32; 6] = [50, 100, 250, 500, 1000, 10000];

const EMERGENCY_NOTE: &str =
    "Keep active - this circuit carries 911 emergency traffic and cannot be decommissioned";
const POLICY_NOTE: &str = "Keep active - all circuits ending with 2 are part of critical infrastructure and cannot be decommissioned per company policy";

/// Circuits 1, 3, 5, 7 and 9 come pre-rejected for emergency traffic.
const EMERGENCY_CIRCUITS: [usize; 5] = [1, 3, 5, 7, 9];

#[rustfmt::skip]
const LOCATIONS: [&str; 104] = [
    "New York - Manhattan", "Los Angeles - Downtown", "Chicago - Loop", "Houston - Energy Corridor",
    "Phoenix - Downtown", "Philadelphia - Center City", "San Antonio - Medical Center", "San Diego - Mission Valley",
    "Dallas - Uptown", "Austin - Domain", "Jacksonville - Riverside", "San Jose - Silicon Valley",
    "Fort Worth - Downtown", "Columbus - Short North", "Charlotte - Uptown", "Indianapolis - Downtown",
    "Seattle - Capitol Hill", "Denver - LoDo", "Boston - Back Bay", "Portland - Pearl District",
    "Nashville - Midtown", "Detroit - Downtown", "Memphis - Medical District", "Louisville - Downtown",
    "Baltimore - Harbor East", "Milwaukee - Third Ward", "Albuquerque - Downtown", "Tucson - University",
    "Fresno - Tower District", "Sacramento - Midtown", "Kansas City - Crossroads", "Mesa - Downtown",
    "Atlanta - Midtown", "Omaha - Old Market", "Raleigh - Downtown", "Miami - Brickell",
    "Cleveland - Downtown", "Tulsa - Downtown", "Oakland - Jack London Square", "Minneapolis - Downtown",
    "Wichita - Old Town", "Arlington - Downtown", "Tampa - Channelside", "Aurora - Downtown",
    "Anaheim - Platinum Triangle", "Santa Ana - Downtown", "St. Louis - Downtown", "Pittsburgh - Downtown",
    "Cincinnati - Over-the-Rhine", "Bakersfield - Downtown", "Toledo - Downtown", "Riverside - Downtown",
    "Stockton - Downtown", "Corpus Christi - Downtown", "Lexington - Downtown", "Henderson - Downtown",
    "Anchorage - Downtown", "Plano - Legacy West", "Newark - Downtown", "Lincoln - Haymarket",
    "Orlando - Downtown", "Irvine - Spectrum Center", "Chula Vista - Downtown", "Durham - Downtown",
    "Buffalo - Downtown", "Chandler - Downtown", "Reno - Downtown", "Norfolk - Downtown",
    "Gilbert - Downtown", "Irving - Las Colinas", "Scottsdale - Old Town", "Baton Rouge - Downtown",
    "Spokane - Downtown", "Richmond - Downtown", "Des Moines - Downtown", "Boise - Downtown",
    "Tacoma - Downtown", "Fremont - Downtown", "San Bernardino - Downtown", "Modesto - Downtown",
    "Birmingham - Downtown", "Rochester - Downtown", "Oxnard - Downtown", "Fontana - Downtown",
    "Fayetteville - Downtown", "Moreno Valley - Downtown", "Huntington Beach - Downtown", "Glendale - Downtown",
    "Yonkers - Downtown", "Salt Lake City - Downtown", "Grand Rapids - Downtown", "Amarillo - Downtown",
    "Worcester - Downtown", "Little Rock - Downtown", "Augusta - Downtown", "Port St. Lucie - Downtown",
    "Cape Coral - Downtown", "Sioux Falls - Downtown", "Peoria - Downtown", "Springfield - Downtown",
    "Vancouver - Downtown", "Knoxville - Downtown", "Brownsville - Downtown", "Fort Lauderdale - Downtown",
];

fn pick<T: Copy>(rng: &mut StdRng, all: &[T]) -> T {
    all[rng.gen_range(0..all.len())]
}

/// Generate `count` synthetic circuits `CKT-2024-001`, `CKT-2024-002`, ...
///
/// The same seed always yields the same metrics. A few circuits come
/// pre-rejected with feedback so the miner has something to learn from.
pub fn generate_circuits(count: usize, seed: Option<u64>, author: &str) -> Vec<Circuit> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let now = Utc::now();

    (1..=count)
        .map(|i| {
            let id = format!("CKT-2024-{i:03}");
            let location = LOCATIONS
                .get(i - 1)
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("Location {i}"));
            let mut c = Circuit::new(id, location);

            c.bandwidth = pick(&mut rng, &BANDWIDTHS);
            let util: u32 = rng.gen_range(0..100);
            c.utilization = f64::from(util);
            c.age = rng.gen_range(1..=84);
            c.traffic = (f64::from(c.bandwidth) * f64::from(util) / 100.0 * 0.9).floor();
            c.cost = ((rng.gen::<f64>() * 20.0 + 5.0) * 100.0).round() / 100.0;
            c.contract_status = pick(&mut rng, ContractStatus::ALL);
            c.service_type = pick(&mut rng, ServiceType::ALL);
            c.redundancy = pick(&mut rng, Redundancy::ALL);
            c.site_status = pick(&mut rng, SiteStatus::ALL);
            c.hardware_eol = pick(&mut rng, HardwareEol::ALL);
            c.provider_status = pick(&mut rng, ProviderStatus::ALL);

            c.history.push(HistoryEvent {
                event: HistoryEventKind::Created,
                timestamp: now,
                author: author.to_string(),
                description: "Generated sample circuit".to_string(),
            });

            let mut notes = Vec::new();
            if EMERGENCY_CIRCUITS.contains(&i) {
                notes.push(EMERGENCY_NOTE);
            }
            if c.id.ends_with('2') {
                notes.push(POLICY_NOTE);
            }
            for note in notes {
                seed_rejection(&mut c, note, author, now);
            }
            c
        })
        .collect()
}

fn seed_rejection(c: &mut Circuit, note: &str, author: &str, now: chrono::DateTime<Utc>) {
    c.status = CircuitStatus::Rejected;
    c.comments.push(CommentRecord {
        text: note.to_string(),
        author: author.to_string(),
        timestamp: now,
        decision: DECISION_KEEP_ACTIVE.to_string(),
    });
    c.history.push(HistoryEvent {
        event: HistoryEventKind::Rejected,
        timestamp: now,
        author: author.to_string(),
        description: format!("Kept active: {note}"),
    });
}
