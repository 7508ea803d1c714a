//! Pantry and saved recipes

use crate::storage::{StateKey, StorageResult};
use crate::tracker::engine::Tracker;
use crate::tracker::types::UserRecipe;

/// Ingredients a new pantry starts with
pub fn default_pantry() -> Vec<String> {
    [
        "Pan",
        "huevo",
        "jamón",
        "salchicha",
        "atún",
        "nuggets",
        "fresas congeladas",
        "plátano",
        "proteína en polvo",
        "zucaritas",
        "leche",
        "galletas",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Tracker {
    /// Pantry contents; the default list when never written
    pub fn get_pantry(&self) -> StorageResult<Vec<String>> {
        self.load_with(
            StateKey::Pantry,
            |raw| serde_json::from_str(raw),
            default_pantry,
        )
    }

    /// Add an ingredient unless blank or already present
    pub fn add_to_pantry(&self, item: &str) -> StorageResult<Vec<String>> {
        let _guard = self.write_guard()?;
        let mut pantry = self.get_pantry()?;
        let item = item.trim();

        if item.is_empty() || pantry.iter().any(|p| p == item) {
            return Ok(pantry);
        }

        pantry.push(item.to_string());
        self.save(StateKey::Pantry, &pantry)?;
        tracing::debug!(item, "Added pantry item");
        Ok(pantry)
    }

    pub fn remove_from_pantry(&self, item: &str) -> StorageResult<Vec<String>> {
        let _guard = self.write_guard()?;
        let mut pantry = self.get_pantry()?;
        pantry.retain(|p| p != item.trim());
        self.save(StateKey::Pantry, &pantry)?;
        Ok(pantry)
    }

    pub fn get_user_recipes(&self) -> StorageResult<Vec<UserRecipe>> {
        self.load(StateKey::Recipes)
    }

    /// Save a recipe, assigning an id when it has none
    pub fn add_user_recipe(&self, mut recipe: UserRecipe) -> StorageResult<Vec<UserRecipe>> {
        let _guard = self.write_guard()?;
        if recipe.id.trim().is_empty() {
            recipe.id = Self::new_id();
        }
        tracing::debug!(id = %recipe.id, "Saving recipe");

        let mut recipes = self.get_user_recipes()?;
        recipes.push(recipe);
        self.save(StateKey::Recipes, &recipes)?;
        Ok(recipes)
    }

    pub fn remove_user_recipe(&self, id: &str) -> StorageResult<Vec<UserRecipe>> {
        let _guard = self.write_guard()?;
        let mut recipes = self.get_user_recipes()?;
        let before = recipes.len();
        recipes.retain(|r| r.id != id);

        if recipes.len() != before {
            self.save(StateKey::Recipes, &recipes)?;
        }
        Ok(recipes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringRules;
    use crate::storage::{KvStore, MemoryStore};
    use crate::tracker::clock::FixedClock;
    use crate::tracker::types::{CalendarDate, RecipeMacros};
    use std::sync::Arc;

    fn create_test_tracker() -> (Tracker, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::on(CalendarDate::from_ymd(2024, 6, 15).unwrap(), 12));
        (Tracker::new(store.clone(), clock, ScoringRules::default()), store)
    }

    #[test]
    fn test_pantry_defaults_when_absent() {
        let (tracker, _) = create_test_tracker();
        assert_eq!(tracker.get_pantry().unwrap(), default_pantry());
    }

    #[test]
    fn test_pantry_add_dedupes_and_trims() {
        let (tracker, _) = create_test_tracker();
        let start = tracker.get_pantry().unwrap().len();

        tracker.add_to_pantry("  avena ").unwrap();
        tracker.add_to_pantry("avena").unwrap();
        let pantry = tracker.add_to_pantry("   ").unwrap();

        assert_eq!(pantry.len(), start + 1);
        assert_eq!(pantry.last().map(String::as_str), Some("avena"));
    }

    #[test]
    fn test_pantry_remove() {
        let (tracker, store) = create_test_tracker();
        store.put(StateKey::Pantry, r#"["leche","huevo"]"#).unwrap();

        let pantry = tracker.remove_from_pantry("leche").unwrap();
        assert_eq!(pantry, vec!["huevo".to_string()]);
    }

    #[test]
    fn test_recipes_add_assigns_id_and_remove() {
        let (tracker, _) = create_test_tracker();
        let recipe = UserRecipe {
            id: String::new(),
            title: "Overnight oats".to_string(),
            ingredients: vec!["avena".to_string(), "leche".to_string()],
            instructions: "Mix and chill.".to_string(),
            macros: Some(RecipeMacros {
                calories: "350".to_string(),
                ..RecipeMacros::default()
            }),
        };

        let recipes = tracker.add_user_recipe(recipe).unwrap();
        assert_eq!(recipes.len(), 1);
        assert!(!recipes[0].id.is_empty());

        let id = recipes[0].id.clone();
        assert!(tracker.remove_user_recipe(&id).unwrap().is_empty());
        assert!(tracker.get_user_recipes().unwrap().is_empty());
    }
}
