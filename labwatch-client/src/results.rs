//! Results document parsing
//!
//! Turns the XML returned by a status query into a [`ResultsDocument`].
//! The root element is either `<job>` or `<recipe>`; anything else is a
//! parse error.

use labwatch_core::domain::job::{JobId, RecipeId, Status};
use labwatch_core::domain::results::{JobResults, RecipeRequest, RecipeResults, ResultsDocument};
use roxmltree::{Document, Node};

use crate::error::{ClientError, Result};

/// Recipe attributes carried over when a recipe is submitted again
const REQUEST_ATTRIBUTES: &[&str] = &[
    "kernel_options",
    "kernel_options_post",
    "ks_meta",
    "role",
    "whiteboard",
];

/// Child elements that only describe a past execution
const RESULT_ONLY_ELEMENTS: &[&str] = &["logs"];

/// Parses a results document
pub fn parse_results(xml: &str) -> Result<ResultsDocument> {
    let doc = Document::parse(xml)
        .map_err(|e| ClientError::ParseError(format!("invalid XML: {}", e)))?;
    let root = doc.root_element();

    match root.tag_name().name() {
        "job" => parse_job(xml, root).map(ResultsDocument::Job),
        "recipe" => parse_recipe(xml, root).map(ResultsDocument::Recipe),
        other => Err(ClientError::ParseError(format!(
            "unexpected root element <{}>",
            other
        ))),
    }
}

fn parse_job(xml: &str, job: Node) -> Result<JobResults> {
    let whiteboard = job
        .children()
        .find(|n| n.has_tag_name("whiteboard"))
        .map(|n| n.text().unwrap_or_default().trim().to_string());

    let recipes = job
        .children()
        .filter(|n| n.has_tag_name("recipeSet"))
        .flat_map(|set| set.children().filter(|n| n.has_tag_name("recipe")))
        .map(|recipe| parse_recipe(xml, recipe))
        .collect::<Result<Vec<_>>>()?;

    Ok(JobResults {
        id: job.attribute("id").map(JobId::from_numeric),
        status: Status::parse(job.attribute("status")),
        result: job.attribute("result").map(str::to_string),
        whiteboard,
        recipes,
    })
}

fn parse_recipe(xml: &str, recipe: Node) -> Result<RecipeResults> {
    let id = recipe
        .attribute("id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ClientError::ParseError("recipe without an id".to_string()))?;

    let attributes = REQUEST_ATTRIBUTES
        .iter()
        .filter_map(|name| {
            recipe
                .attribute(*name)
                .map(|value| (name.to_string(), value.to_string()))
        })
        .collect();

    let mut request = RecipeRequest {
        attributes,
        ..Default::default()
    };

    for child in recipe.children().filter(Node::is_element) {
        let markup = xml[child.range()].to_string();
        match child.tag_name().name() {
            "hostRequires" => request.host_requires = Some(markup),
            name if RESULT_ONLY_ELEMENTS.contains(&name) => {}
            _ => request.elements.push(markup),
        }
    }

    Ok(RecipeResults {
        id: RecipeId::from_numeric(id),
        status: Status::parse(recipe.attribute("status")),
        result: recipe.attribute("result").map(str::to_string),
        system: recipe
            .attribute("system")
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        request,
    })
}
