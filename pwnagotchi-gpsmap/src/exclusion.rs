/// Case-insensitive fragments of ESSIDs, BSSIDs or network ids that are
/// never reported. A MAC fragment matches with or without colons.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
  patterns: Vec<String>,
}

impl ExclusionFilter {
  pub fn new<I, S>(patterns: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self {
      patterns: patterns
        .into_iter()
        .map(|p| p.as_ref().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.patterns.is_empty()
  }

  pub fn is_excluded(&self, what: &str) -> bool {
    let what = what.to_lowercase();
    self.patterns.iter().any(|skip| {
      let bare = skip.replace(':', "");
      what.contains(skip.as_str()) || (!bare.is_empty() && what.contains(&bare))
    })
  }
}
