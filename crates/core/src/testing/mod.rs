//! Testing utilities and mock implementations.
//!
//! Mocks for every external seam (CRM, LLM, content generator) plus a
//! deterministic random source, so workflows and HTTP handlers can be tested
//! without Salesforce or OpenAI.
//!
//! # Example
//!
//! ```rust,ignore
//! use casegen_core::testing::{fixtures, FixedRandom, MockCrm, MockGenerator};
//!
//! let crm = MockCrm::new();
//! crm.set_accounts(fixtures::accounts(5)).await;
//! let generator = MockGenerator::new();
//!
//! let workflow = CaseWorkflow::new(Arc::new(crm.clone()), Arc::new(generator), Default::default())
//!     .with_random(Arc::new(FixedRandom::new(0.1, 0)));
//! ```

mod mock_crm;
mod mock_generator;
mod mock_llm;

pub use mock_crm::MockCrm;
pub use mock_generator::MockGenerator;
pub use mock_llm::MockLlmClient;

use crate::workflow::RandomSource;

/// Random source returning the same draws every time.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom {
    unit: f64,
    index: usize,
}

impl FixedRandom {
    /// `unit` is returned by every draw; `index` is clamped to the list length.
    pub fn new(unit: f64, index: usize) -> Self {
        Self { unit, index }
    }
}

impl RandomSource for FixedRandom {
    fn next_unit(&self) -> f64 {
        self.unit
    }

    fn pick_index(&self, len: usize) -> usize {
        self.index.min(len.saturating_sub(1))
    }
}

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::crm::Account;
    use crate::generator::GeneratedContent;

    const PRACTICES: [&str; 5] = [
        "Riverside Family Practice",
        "Northwind Clinic",
        "St. Mary Medical Group",
        "Lakeview Pediatrics",
        "Summit Orthopedics",
    ];

    /// `count` accounts with ids `001000000000001`, `001000000000002`, ...
    pub fn accounts(count: usize) -> Vec<Account> {
        (1..=count)
            .map(|i| {
                Account::new(
                    format!("001{:012}", i),
                    format!("{} #{}", PRACTICES[(i - 1) % PRACTICES.len()], i),
                )
            })
            .collect()
    }

    /// Plausible generated ticket content.
    pub fn content() -> GeneratedContent {
        GeneratedContent::new(
            "Appointment scheduler shows double bookings",
            "Hello,\n\nSince this morning the scheduler lets two patients book the same slot. \
             We have already had three collisions today. Please advise.\n\nRegards,\nDana",
        )
    }

    /// The reply a well-behaved model sends for `content()`.
    pub fn content_json() -> String {
        serde_json::to_string(&content()).unwrap()
    }
}
