use crate::ast::{ElementType, Form};
use crc32fast::Hasher;
use std::collections::HashSet;

/// Generate the identifier seed for a form from its id using CRC32
pub fn get_form_seed(form_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(form_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential, type-tagged ID generator for the elements of one form
///
/// IDs have the shape `{type}-{seed}-{count}`. Every ID handed out or
/// reserved is remembered, so a generator built with [`IdGenerator::for_form`]
/// never returns an ID that already exists in the loaded document.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
    issued: HashSet<String>,
}

impl IdGenerator {
    pub fn new(form_id: &str) -> Self {
        Self::from_seed(get_form_seed(form_id))
    }

    pub fn from_seed(seed: String) -> Self {
        Self {
            seed,
            count: 0,
            issued: HashSet::new(),
        }
    }

    /// Generator seeded from the form id with every existing element id reserved
    pub fn for_form(form: &Form) -> Self {
        let mut generator = Self::new(&form.id);
        for element in form.root.pre_order() {
            generator.reserve(&element.id);
        }
        generator
    }

    /// Mark an id as taken
    pub fn reserve(&mut self, id: &str) {
        self.issued.insert(id.to_string());
    }

    pub fn is_taken(&self, id: &str) -> bool {
        self.issued.contains(id)
    }

    /// Generate next unused ID for an element of the given type
    pub fn generate(&mut self, element_type: ElementType) -> String {
        loop {
            self.count += 1;
            let candidate = format!("{}-{}-{}", element_type, self.seed, self.count);
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Get form ID seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}
