//! Quest definitions: named filters loaded from configuration.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::elementfilter::{ElementFilter, parse_filter};
use crate::mapdata::Element;

/// Raw quest definition from YAML (before compilation).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuestConfig {
    pub name: String,
    /// The filter expression, e.g. `ways with surface ~ paved|unpaved`.
    pub filter: String,
}

/// Raw quest definition file.
#[derive(Debug, Deserialize, Serialize)]
pub struct QuestsConfig {
    pub quests: Vec<QuestConfig>,
}

impl QuestsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// A quest with its compiled filter.
#[derive(Debug, Clone)]
pub struct CompiledQuest {
    pub name: String,
    pub filter: ElementFilter,
}

/// Compile every quest filter, failing fast on the first invalid one.
pub fn compile_quests(config: &QuestsConfig) -> Result<Vec<CompiledQuest>> {
    let mut quests = Vec::with_capacity(config.quests.len());

    for (i, quest) in config.quests.iter().enumerate() {
        let filter = parse_filter(&quest.filter).map_err(|e| {
            anyhow::anyhow!("Error parsing filter {} for quest '{}': {}", i + 1, quest.name, e)
        })?;
        tracing::debug!("Compiled quest '{}' as {}", quest.name, filter);

        quests.push(CompiledQuest {
            name: quest.name.clone(),
            filter,
        });
    }

    Ok(quests)
}

/// Names of the quests whose filter matches the element, in definition order.
pub fn quests_for_element<'a>(quests: &'a [CompiledQuest], element: &Element) -> Vec<&'a str> {
    quests
        .iter()
        .filter(|quest| quest.filter.matches(element))
        .map(|quest| quest.name.as_str())
        .collect()
}

/// Count matches per quest over a set of elements.
pub fn count_matches(quests: &[CompiledQuest], elements: &[Element]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for quest in quests {
        let count = elements.iter().filter(|e| quest.filter.matches(e)).count();
        counts.insert(quest.name.clone(), count);
    }
    counts
}
