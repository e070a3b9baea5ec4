//! Competitor: one roster entry.
//!
//! Only `age` and `master` take part in pairing. The remaining descriptive
//! fields are carried through to match snapshots verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Grouping key used for competitors without a master.
pub const UNKNOWN_MASTER: &str = "unknown";

/// Input for registering a competitor. The store assigns `id` and
/// `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompetitor {
  pub name:     String,
  pub age:      Option<u32>,
  pub master:   Option<String>,
  pub belt:     Option<String>,
  pub weight:   Option<String>,
  pub district: Option<String>,
  pub city:     Option<String>,
  pub email:    Option<String>,
}

impl NewCompetitor {
  /// Convenience constructor with all optional fields unset.
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  /// Trim every text field, turn blank optional fields into `None`, and
  /// reject a blank name.
  pub fn validate(self) -> Result<Self> {
    let name = self.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::validation("missing name"));
    }
    Ok(Self {
      name,
      age: self.age,
      master: non_blank(self.master),
      belt: non_blank(self.belt),
      weight: non_blank(self.weight),
      district: non_blank(self.district),
      city: non_blank(self.city),
      email: non_blank(self.email),
    })
  }
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

/// A registered competitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
  pub id:         Uuid,
  pub created_at: DateTime<Utc>,
  pub name:       String,
  pub age:        Option<u32>,
  pub master:     Option<String>,
  pub belt:       Option<String>,
  pub weight:     Option<String>,
  pub district:   Option<String>,
  pub city:       Option<String>,
  pub email:      Option<String>,
}

impl Competitor {
  /// Validate `input` and give it a fresh identity.
  pub fn register(input: NewCompetitor) -> Result<Self> {
    let input = input.validate()?;
    Ok(Self {
      id:         Uuid::new_v4(),
      created_at: Utc::now(),
      name:       input.name,
      age:        input.age,
      master:     input.master,
      belt:       input.belt,
      weight:     input.weight,
      district:   input.district,
      city:       input.city,
      email:      input.email,
    })
  }

  /// The master used for grouping. Missing or empty masters all share
  /// [`UNKNOWN_MASTER`], so two such competitors count as the same school.
  pub fn master_key(&self) -> &str {
    self
      .master
      .as_deref()
      .filter(|m| !m.is_empty())
      .unwrap_or(UNKNOWN_MASTER)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validate_trims_and_drops_blank_fields() {
    let input = NewCompetitor {
      name: "  Arjun ".into(),
      master: Some("   ".into()),
      belt: Some(" yellow ".into()),
      ..NewCompetitor::default()
    };
    let valid = input.validate().unwrap();
    assert_eq!(valid.name, "Arjun");
    assert_eq!(valid.master, None);
    assert_eq!(valid.belt.as_deref(), Some("yellow"));
  }

  #[test]
  fn blank_name_is_rejected() {
    let err = NewCompetitor::new("   ").validate().unwrap_err();
    assert!(matches!(err, Error::Validation(m) if m == "missing name"));
  }

  #[test]
  fn missing_and_empty_masters_share_the_unknown_key() {
    let mut c = Competitor::register(NewCompetitor::new("Kai")).unwrap();
    assert_eq!(c.master_key(), UNKNOWN_MASTER);
    c.master = Some(String::new());
    assert_eq!(c.master_key(), UNKNOWN_MASTER);
    c.master = Some("Sensei Ito".into());
    assert_eq!(c.master_key(), "Sensei Ito");
  }
}
