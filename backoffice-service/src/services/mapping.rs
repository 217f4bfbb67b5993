//! Supplier mapping demo: static supplier catalogues, advisory match
//! suggestions and in-memory operator decisions.
//!
//! Scores are a heuristic for the review screens only. Nothing here is
//! persisted or forwarded to the booking backend.

use crate::models::{
    CountryRecord, DecisionStatus, HotelRecord, MappingDecision, MappingEntity,
};
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// Minimum score for a candidate to be offered as the suggested match.
pub const SUGGESTION_THRESHOLD: f64 = 0.6;

const HOTEL_NAME_WEIGHT: f64 = 0.5;
const HOTEL_ADDRESS_WEIGHT: f64 = 0.2;
const HOTEL_GEO_WEIGHT: f64 = 0.3;
/// Hotels further apart than this get no geo score.
const GEO_CUTOFF_KM: f64 = 2.0;

const NAME_STOP_WORDS: &[&str] = &["hotel", "the", "and", "resort", "suites", "by", "&"];

static MASTER_COUNTRIES: &[CountryRecord] = &[
    CountryRecord { source: "master", code: "AE", name: "United Arab Emirates" },
    CountryRecord { source: "master", code: "GB", name: "United Kingdom" },
    CountryRecord { source: "master", code: "FR", name: "France" },
    CountryRecord { source: "master", code: "TR", name: "Turkey" },
    CountryRecord { source: "master", code: "EG", name: "Egypt" },
    CountryRecord { source: "master", code: "SA", name: "Saudi Arabia" },
];

static SUPPLIER_COUNTRIES: &[CountryRecord] = &[
    CountryRecord { source: "hotelbeds", code: "AE", name: "United Arab Emirates" },
    CountryRecord { source: "hotelbeds", code: "UK", name: "United Kingdom" },
    CountryRecord { source: "hotelbeds", code: "FR", name: "France" },
    CountryRecord { source: "webbeds", code: "UAE", name: "U.A.E." },
    CountryRecord { source: "webbeds", code: "TUR", name: "Turkiye" },
    CountryRecord { source: "webbeds", code: "EGY", name: "Egypt" },
    CountryRecord { source: "webbeds", code: "KSA", name: "Kingdom of Saudi Arabia" },
];

static MASTER_HOTELS: &[HotelRecord] = &[
    HotelRecord {
        source: "master",
        code: "H-1001",
        name: "Atlantis The Palm",
        address: "Crescent Road, The Palm, Dubai",
        country_code: "AE",
        latitude: 25.1304,
        longitude: 55.1171,
    },
    HotelRecord {
        source: "master",
        code: "H-1002",
        name: "Jumeirah Beach Hotel",
        address: "Jumeirah Street, Umm Suqeim 3, Dubai",
        country_code: "AE",
        latitude: 25.1413,
        longitude: 55.1905,
    },
    HotelRecord {
        source: "master",
        code: "H-2001",
        name: "The Savoy",
        address: "Strand, London WC2R 0EZ",
        country_code: "GB",
        latitude: 51.5104,
        longitude: -0.1204,
    },
    HotelRecord {
        source: "master",
        code: "H-3001",
        name: "Hotel Le Meurice",
        address: "228 Rue de Rivoli, 75001 Paris",
        country_code: "FR",
        latitude: 48.8651,
        longitude: 2.3281,
    },
];

static SUPPLIER_HOTELS: &[HotelRecord] = &[
    HotelRecord {
        source: "hotelbeds",
        code: "HB-88231",
        name: "Atlantis, The Palm",
        address: "Crescent Rd, Palm Jumeirah, Dubai",
        country_code: "AE",
        latitude: 25.1306,
        longitude: 55.1175,
    },
    HotelRecord {
        source: "webbeds",
        code: "WB-5512",
        name: "Jumeirah Beach Hotel Dubai",
        address: "Jumeirah St, Umm Suqeim, Dubai",
        country_code: "AE",
        latitude: 25.1410,
        longitude: 55.1902,
    },
    HotelRecord {
        source: "webbeds",
        code: "WB-7710",
        name: "Rove Downtown",
        address: "312 Al Sa'ada Street, Dubai",
        country_code: "AE",
        latitude: 25.1943,
        longitude: 55.2843,
    },
    HotelRecord {
        source: "hotelbeds",
        code: "HB-10442",
        name: "Savoy Hotel London",
        address: "Strand, London",
        country_code: "GB",
        latitude: 51.5103,
        longitude: -0.1205,
    },
    HotelRecord {
        source: "hotelbeds",
        code: "HB-30019",
        name: "Le Meurice",
        address: "228 rue de Rivoli, Paris",
        country_code: "FR",
        latitude: 48.8652,
        longitude: 2.3280,
    },
];

/// Candidate master record with its score.
#[derive(Debug, Clone, Serialize)]
pub struct MatchCandidate {
    pub master_code: &'static str,
    pub master_name: &'static str,
    pub score: f64,
}

/// A supplier record with its best master candidates and current decision.
#[derive(Debug, Clone, Serialize)]
pub struct MappingRow<T: Serialize> {
    pub record: T,
    pub suggested: Option<MatchCandidate>,
    pub candidates: Vec<MatchCandidate>,
    pub decision: Option<MappingDecision>,
}

/// Lowercase, strip punctuation and drop filler words.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty() && !NAME_STOP_WORDS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn bigrams(s: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Sørensen–Dice coefficient over character bigrams of the normalized names.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_name(a);
    let b = normalize_name(b);

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let a_bigrams = bigrams(&a);
    let mut b_bigrams = bigrams(&b);
    if a_bigrams.is_empty() || b_bigrams.is_empty() {
        return 0.0;
    }

    let total = a_bigrams.len() + b_bigrams.len();
    let mut shared = 0usize;
    for bigram in &a_bigrams {
        if let Some(pos) = b_bigrams.iter().position(|other| other == bigram) {
            b_bigrams.swap_remove(pos);
            shared += 1;
        }
    }

    (2 * shared) as f64 / total as f64
}

fn address_tokens(address: &str) -> HashSet<String> {
    address
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(|t| match t {
            "rd" => "road".to_string(),
            "st" => "street".to_string(),
            other => other.to_string(),
        })
        .collect()
}

/// Jaccard overlap of address tokens.
pub fn address_similarity(a: &str, b: &str) -> f64 {
    let a = address_tokens(a);
    let b = address_tokens(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

pub fn hotel_score(supplier: &HotelRecord, master: &HotelRecord) -> f64 {
    let name = name_similarity(supplier.name, master.name);
    let address = address_similarity(supplier.address, master.address);
    let distance = haversine_km(
        supplier.latitude,
        supplier.longitude,
        master.latitude,
        master.longitude,
    );
    let geo = (1.0 - distance / GEO_CUTOFF_KM).max(0.0);

    round_score(HOTEL_NAME_WEIGHT * name + HOTEL_ADDRESS_WEIGHT * address + HOTEL_GEO_WEIGHT * geo)
}

/// Codes match outright; otherwise compare names.
pub fn country_score(supplier: &CountryRecord, master: &CountryRecord) -> f64 {
    if supplier.code.eq_ignore_ascii_case(master.code) {
        return 1.0;
    }
    round_score(name_similarity(supplier.name, master.name))
}

fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

fn rank(mut candidates: Vec<MatchCandidate>) -> (Option<MatchCandidate>, Vec<MatchCandidate>) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(3);
    let suggested = candidates
        .first()
        .filter(|c| c.score >= SUGGESTION_THRESHOLD)
        .cloned();
    (suggested, candidates)
}

/// Catalogue plus the decisions taken during this process's lifetime.
#[derive(Default)]
pub struct MappingStore {
    decisions: DashMap<(MappingEntity, String, String), MappingDecision>,
}

impl MappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn countries(&self) -> Vec<MappingRow<CountryRecord>> {
        SUPPLIER_COUNTRIES
            .iter()
            .map(|supplier| {
                let candidates = MASTER_COUNTRIES
                    .iter()
                    .map(|master| MatchCandidate {
                        master_code: master.code,
                        master_name: master.name,
                        score: country_score(supplier, master),
                    })
                    .collect();
                let (suggested, candidates) = rank(candidates);
                MappingRow {
                    record: supplier.clone(),
                    suggested,
                    candidates,
                    decision: self.decision(MappingEntity::Country, supplier.source, supplier.code),
                }
            })
            .collect()
    }

    /// Supplier hotels, optionally limited to one master country code.
    pub fn hotels(&self, country_code: Option<&str>) -> Vec<MappingRow<HotelRecord>> {
        SUPPLIER_HOTELS
            .iter()
            .filter(|h| country_code.map_or(true, |cc| h.country_code.eq_ignore_ascii_case(cc)))
            .map(|supplier| {
                let candidates = MASTER_HOTELS
                    .iter()
                    .filter(|m| m.country_code == supplier.country_code)
                    .map(|master| MatchCandidate {
                        master_code: master.code,
                        master_name: master.name,
                        score: hotel_score(supplier, master),
                    })
                    .collect();
                let (suggested, candidates) = rank(candidates);
                MappingRow {
                    record: supplier.clone(),
                    suggested,
                    candidates,
                    decision: self.decision(MappingEntity::Hotel, supplier.source, supplier.code),
                }
            })
            .collect()
    }

    pub fn supplier_record_exists(&self, entity: MappingEntity, supplier: &str, code: &str) -> bool {
        match entity {
            MappingEntity::Country => SUPPLIER_COUNTRIES
                .iter()
                .any(|c| c.source == supplier && c.code == code),
            MappingEntity::Hotel => SUPPLIER_HOTELS
                .iter()
                .any(|h| h.source == supplier && h.code == code),
        }
    }

    pub fn master_record_exists(&self, entity: MappingEntity, code: &str) -> bool {
        match entity {
            MappingEntity::Country => MASTER_COUNTRIES.iter().any(|c| c.code == code),
            MappingEntity::Hotel => MASTER_HOTELS.iter().any(|h| h.code == code),
        }
    }

    /// Record a decision, replacing any earlier one for the same supplier record.
    pub fn decide(
        &self,
        entity: MappingEntity,
        supplier: &str,
        supplier_code: &str,
        master_code: Option<String>,
        status: DecisionStatus,
    ) -> MappingDecision {
        let decision = MappingDecision {
            decision_id: Uuid::new_v4(),
            entity,
            supplier: supplier.to_string(),
            supplier_code: supplier_code.to_string(),
            master_code,
            status,
            decided_utc: Utc::now(),
        };

        self.decisions.insert(
            (entity, supplier.to_string(), supplier_code.to_string()),
            decision.clone(),
        );

        decision
    }

    pub fn decisions(&self) -> Vec<MappingDecision> {
        let mut decisions: Vec<MappingDecision> =
            self.decisions.iter().map(|e| e.value().clone()).collect();
        decisions.sort_by_key(|d| d.decided_utc);
        decisions
    }

    fn decision(&self, entity: MappingEntity, supplier: &str, code: &str) -> Option<MappingDecision> {
        self.decisions
            .get(&(entity, supplier.to_string(), code.to_string()))
            .map(|d| d.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_drops_filler_words() {
        assert_eq!(normalize_name("Atlantis, The Palm"), "atlantis palm");
        assert_eq!(normalize_name("The Savoy Hotel"), "savoy");
    }

    #[test]
    fn identical_names_score_one() {
        assert_eq!(name_similarity("Le Meurice", "Hotel Le Meurice"), 1.0);
        assert_eq!(name_similarity("", "Le Meurice"), 0.0);
    }

    #[test]
    fn haversine_is_roughly_correct() {
        // London to Paris is ~344 km
        let d = haversine_km(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 344.0).abs() < 5.0);
    }

    #[test]
    fn suggestions_pick_the_right_hotel() {
        let store = MappingStore::new();
        let rows = store.hotels(Some("AE"));

        let atlantis = rows.iter().find(|r| r.record.code == "HB-88231").unwrap();
        assert_eq!(atlantis.suggested.as_ref().unwrap().master_code, "H-1001");

        let rove = rows.iter().find(|r| r.record.code == "WB-7710").unwrap();
        assert!(rove.suggested.is_none());
    }

    #[test]
    fn country_codes_match_directly() {
        let store = MappingStore::new();
        let rows = store.countries();

        let france = rows
            .iter()
            .find(|r| r.record.source == "hotelbeds" && r.record.code == "FR")
            .unwrap();
        let suggested = france.suggested.as_ref().unwrap();
        assert_eq!(suggested.master_code, "FR");
        assert_eq!(suggested.score, 1.0);
    }

    #[test]
    fn decisions_replace_previous_ones() {
        let store = MappingStore::new();
        store.decide(MappingEntity::Hotel, "webbeds", "WB-7710", None, DecisionStatus::Rejected);
        store.decide(
            MappingEntity::Hotel,
            "webbeds",
            "WB-7710",
            Some("H-1002".to_string()),
            DecisionStatus::Mapped,
        );

        let decisions = store.decisions();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].status, DecisionStatus::Mapped);

        let row = store
            .hotels(None)
            .into_iter()
            .find(|r| r.record.code == "WB-7710")
            .unwrap();
        assert_eq!(row.decision.unwrap().master_code.as_deref(), Some("H-1002"));
    }
}
