use crc32fast::Hasher;
use std::collections::HashSet;

/// Generate a document id from its name using CRC32
pub fn get_document_id(name: &str) -> String {
    let mut buff = String::from(name);
    if !name.starts_with("tessera://") {
        buff = format!("tessera://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator.
///
/// Block ids are `{seed}-{n}` where the seed is the document id. Element ids
/// use the owning block id as their seed, so they are unique across the
/// whole document and not only within one block.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(name: &str) -> Self {
        Self {
            seed: get_document_id(name),
            count: 0,
        }
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Generate the next id that is not already in `taken`.
    ///
    /// Counters restart at zero after a document is loaded from JSON, so
    /// every generator used on loaded data goes through this.
    pub fn next_unused(&mut self, taken: &HashSet<String>) -> String {
        loop {
            let id = self.new_id();
            if !taken.contains(&id) {
                return id;
            }
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("document")
    }
}
