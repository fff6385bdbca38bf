// Copyright 2022 Jeremy Wall
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use std::collections::BTreeSet;

use recipes::{IngredientManifest, Recipe, RecipeId};

/// The set of recipe ids the user wants to shop for.
///
/// Membership is independent of the current search or filter. The items shown
/// in the cart are always derived from the displayed recipe list so a deleted
/// or edited recipe can never linger in the cart view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSelection {
    ids: BTreeSet<RecipeId>,
}

impl CartSelection {
    pub fn new() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }

    /// Flip membership for `id` and return the new membership.
    pub fn toggle(&mut self, id: RecipeId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Returns true if `id` was in the cart.
    pub fn remove(&mut self, id: RecipeId) -> bool {
        self.ids.remove(&id)
    }

    pub fn contains(&self, id: RecipeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The recipes in `recipes` that are in the cart, in `recipes` order.
    pub fn visible_items<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        recipes.iter().filter(|r| self.contains(r.id)).collect()
    }
}

/// Distinct ingredients across `items` for the shopping list.
pub fn ingredient_manifest<'a, Iter>(items: Iter) -> Vec<String>
where
    Iter: IntoIterator<Item = &'a Recipe>,
{
    let mut acc = IngredientManifest::new();
    for r in items {
        acc.accumulate_from(r);
    }
    acc.ingredients()
}
