use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Governorate {
    pub id: i32,
    pub name: String,
}

/// Id used when a governorate name is not in [`GOVERNORATE_IDS`].
pub const DEFAULT_GOVERNORATE_ID: i32 = 1;

/// Default area sent with every financing request.
pub const DEFAULT_AREA_ID: i32 = 1;

/// Static name → backend id table used when building a submission.
///
/// The backend's ids are not guaranteed to match this table; it mirrors
/// what the web client ships with.
pub const GOVERNORATE_IDS: [(&str, i32); 27] = [
    ("Cairo", 1),
    ("Alexandria", 2),
    ("Giza", 3),
    ("Luxor", 4),
    ("Aswan", 5),
    ("Asyut", 6),
    ("Beheira", 7),
    ("Beni Suef", 8),
    ("Dakahlia", 9),
    ("Damietta", 10),
    ("Fayyum", 11),
    ("Gharbia", 12),
    ("Ismailia", 13),
    ("Kafr el-Sheikh", 14),
    ("Matrouh", 15),
    ("Minya", 16),
    ("Monufia", 17),
    ("New Valley", 18),
    ("North Sinai", 19),
    ("Port Said", 20),
    ("Qalyubia", 21),
    ("Qena", 22),
    ("Red Sea", 23),
    ("Sharqia", 24),
    ("Sohag", 25),
    ("South Sinai", 26),
    ("Suez", 27),
];

/// Look up a governorate id by exact name, defaulting to Cairo.
pub fn governorate_id_for_name(name: &str) -> i32 {
    GOVERNORATE_IDS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, id)| *id)
        .unwrap_or(DEFAULT_GOVERNORATE_ID)
}

/// Installed by the governorate cache when the lookup endpoint fails.
pub fn fallback_governorates() -> Vec<Governorate> {
    [(1, "Cairo"), (2, "Giza"), (3, "Alexandria"), (4, "Luxor"), (5, "Aswan")]
        .into_iter()
        .map(|(id, name)| Governorate {
            id,
            name: name.to_string(),
        })
        .collect()
}
