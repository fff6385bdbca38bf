// Copyright 2021 Jeremy Wall
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
use crate::{Category, ValidationError};

/// Split a comma separated form field into trimmed, non-empty items in input
/// order.
pub fn as_list(i: &str) -> Vec<String> {
    i.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_owned())
        .collect()
}

/// Parse a comma separated list of category tags. Repeated tags collapse to
/// their first occurrence.
pub fn as_categories(i: &str) -> Result<Vec<Category>, ValidationError> {
    let mut out: Vec<Category> = Vec::new();
    for item in as_list(i) {
        let cat: Category = item.parse()?;
        if !out.contains(&cat) {
            out.push(cat);
        }
    }
    Ok(out)
}

/// Join items back into the comma separated form the server stores.
pub fn join_list<Iter, S>(items: Iter) -> String
where
    Iter: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_owned())
        .collect::<Vec<String>>()
        .join(",")
}
