//! Workload definitions

use serde::{Deserialize, Serialize};

/// One key/value pair of a workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Ordered key/value pairs replayed by every phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    entries: Vec<WorkloadEntry>,
}

impl Workload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.entries.push(WorkloadEntry {
            key: key.into(),
            value: value.into(),
        });
    }

    /// Builder-style `push`
    pub fn with(mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.push(key, value);
        self
    }

    pub fn entries(&self) -> &[WorkloadEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Question/answer documents used when no workload is supplied
    pub fn sample() -> Self {
        Self::new()
            .with(
                "aaa",
                r#"{"type":"question","ip":"","text":"<p>Bonjour,<br />Je voudrais savoir quelle est la différence entre un vitrage de 4:16:4 et un de 4:20:4 ?</p>","tags":"fenêtre argon double vitrage"}"#,
            )
            .with(
                "trululu pouet pouet",
                r#"{"type":"question","ip":"2.8.152.24","text":"<p>Bonjour,<br />Nous venons d'acheter une maison sur laquelle il reste encore quelques travaux à faire.</p>","tags":"fenetre grille aeration obligatoire"}"#,
            )
            .with(
                "foobar",
                r#"{"type":"question","ip":"82.225.215.131","text":"<p>Bonjour,</p><p>Je souhaite changer les fenêtres de mon appartement et obtenir une bonne isolation thermique et phonique.</p>"}"#,
            )
            .with(
                "Pere Noel",
                r#"{"type":"question","ip":"86.193.36.153","text":"<p>Bonjour,</p><p>Je dois changer des cales anti dégondage sur deux vitrages coulissants en alu.</p>","tags":"fenêtre baie vitrée coulissante"}"#,
            )
    }
}

impl<K, V> FromIterator<(K, V)> for Workload
where
    K: Into<Vec<u8>>,
    V: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut workload = Workload::new();
        for (key, value) in iter {
            workload.push(key, value);
        }
        workload
    }
}

/// Key used for `key` during iteration `iteration`: `key-iteration`
///
/// Each iteration writes fresh keys instead of overwriting the previous
/// iteration's.
pub fn suffixed_key(key: &[u8], iteration: usize) -> Vec<u8> {
    let suffix = format!("-{}", iteration);
    let mut suffixed = Vec::with_capacity(key.len() + suffix.len());
    suffixed.extend_from_slice(key);
    suffixed.extend_from_slice(suffix.as_bytes());
    suffixed
}
