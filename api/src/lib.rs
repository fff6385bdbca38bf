// Copyright 2022 Jeremy Wall (Jeremy@marzhilsltudios.com)
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
use serde::{Deserialize, Deserializer, Serialize};

use recipes::{parse, Category, Recipe, RecipeFields, RecipeId};

/// A recipe row as the backend serializes it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecipeRecord {
    pub id: RecipeId,
    pub title: String,
    #[serde(deserialize_with = "list_or_joined")]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: String,
    #[serde(default, deserialize_with = "list_or_joined")]
    pub category: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_tried: i32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrJoined {
    List(Vec<String>),
    Joined(String),
}

// NOTE(jwall): Older rows come back with the comma joined column instead of
// a list so we accept both.
fn list_or_joined<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ListOrJoined::deserialize(d)? {
        ListOrJoined::List(items) => items.iter().map(|s| s.trim().to_owned()).collect(),
        ListOrJoined::Joined(s) => parse::as_list(&s),
    })
}

impl From<RecipeRecord> for Recipe {
    fn from(record: RecipeRecord) -> Self {
        Recipe {
            id: record.id,
            title: record.title,
            ingredients: record.ingredients,
            steps: record.steps,
            category: record.category,
            image: record.image_url,
            tried: record.is_tried != 0,
        }
    }
}

pub fn tried_flag(tried: bool) -> i32 {
    if tried {
        1
    } else {
        0
    }
}

/// Acknowledgement payload returned by mutating endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessageResponse {
    pub msg: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Reply to an add or edit. Older backends only acknowledge the save and
/// the caller has to look the row up again.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SaveResponse {
    Record(RecipeRecord),
    Ack(MessageResponse),
}

/// Text fields of the multipart add/edit recipe form in the order the
/// backend expects them.
pub fn form_fields(fields: &RecipeFields) -> Vec<(&'static str, String)> {
    vec![
        ("title", fields.title.clone()),
        ("ingredients", parse::join_list(&fields.ingredients)),
        ("steps", fields.steps.clone()),
        (
            "category",
            parse::join_list(fields.categories.iter().map(|c| c.tag())),
        ),
        ("is_tried", tried_flag(fields.tried).to_string()),
    ]
}

/// Name of the multipart part carrying an uploaded image.
pub const IMAGE_FIELD: &str = "image";

pub fn recipes_path(root: &str) -> String {
    let mut path = root.trim_end_matches('/').to_owned();
    path.push_str("/recipes");
    path
}

pub fn recipe_path(root: &str, id: RecipeId) -> String {
    let mut path = recipes_path(root);
    path.push('/');
    path.push_str(&id.to_string());
    path
}

pub fn add_recipe_path(root: &str) -> String {
    let mut path = root.trim_end_matches('/').to_owned();
    path.push_str("/add-recipe");
    path
}

/// Query parameters for the list endpoint.
pub fn search_query(query: &str) -> Vec<(&'static str, String)> {
    vec![("q", query.to_owned())]
}

pub fn category_query(category: Category) -> Vec<(&'static str, String)> {
    vec![("category", category.tag().to_owned())]
}
