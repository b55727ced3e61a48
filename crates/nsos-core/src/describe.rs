//! One-line display summaries for people on file.
//!
//! Officers and criminals share no state; each formats itself.

use crate::records::{Criminal, Officer};

/// Notes longer than this are cut in a criminal's summary.
const NOTES_PREVIEW_CHARS: usize = 50;

pub trait Describable {
  fn summary(&self) -> String;
}

impl Describable for Officer {
  fn summary(&self) -> String {
    let mut out = format!("Officer: {}, Badge: {}", self.name, self.badge_no);
    if !self.rank.is_empty() {
      out.push_str(", Rank: ");
      out.push_str(&self.rank);
    }
    out
  }
}

impl Describable for Criminal {
  fn summary(&self) -> String {
    let mut out = format!("Criminal: {}, National ID: {}", self.name, self.national_id);
    if !self.notes.is_empty() {
      out.push_str(", Notes: ");
      out.extend(self.notes.chars().take(NOTES_PREVIEW_CHARS));
    }
    out
  }
}

/// Either kind of person, for call sites that list both together.
#[derive(Debug, Clone, Copy)]
pub enum Person<'a> {
  Officer(&'a Officer),
  Criminal(&'a Criminal),
}

impl Person<'_> {
  pub fn name(&self) -> &str {
    match self {
      Self::Officer(o) => &o.name,
      Self::Criminal(c) => &c.name,
    }
  }

  pub fn address(&self) -> &str {
    match self {
      Self::Officer(o) => &o.address,
      Self::Criminal(c) => &c.address,
    }
  }
}

impl Describable for Person<'_> {
  fn summary(&self) -> String {
    match self {
      Self::Officer(o) => o.summary(),
      Self::Criminal(c) => c.summary(),
    }
  }
}
