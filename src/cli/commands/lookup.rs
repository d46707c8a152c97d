use anyhow::Result;

use crate::lookup::LookupSession;
use crate::vocab::VocabularyStore;

use super::load_assistant;

pub async fn run_lookup(to: Option<String>) -> Result<()> {
    let assistant = load_assistant(to)?;
    let store = VocabularyStore::open_default()?;

    let mut session = LookupSession::new(assistant, store);
    session.run().await
}
