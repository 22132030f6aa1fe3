use serde::Serialize;

use cv_core::{narrative, CoreError, CoreResult, Wine};
use cv_utils::slugify;

#[derive(Serialize)]
struct Frontmatter<'a> {
    id: &'a str,
    name: &'a str,
    region: &'a str,
    winery: &'a str,
    year: i32,
    #[serde(rename = "type")]
    wine_type: &'a str,
    grapes: Vec<&'a str>,
    body: &'a str,
    structure: &'a str,
    tannins: &'a str,
    sweetness: &'a str,
    aroma: &'a str,
    rating: u8,
}

/// Render a wine card as Markdown with YAML frontmatter.
pub fn render_wine_markdown(wine: &Wine) -> CoreResult<String> {
    let frontmatter = Frontmatter {
        id: &wine.id,
        name: &wine.name,
        region: &wine.region,
        winery: &wine.winery,
        year: wine.year,
        wine_type: wine.wine_type.label(),
        grapes: wine.varietals(),
        body: wine.body.label(),
        structure: wine.structure.label(),
        tannins: wine.tannins.label(),
        sweetness: wine.sweetness.label(),
        aroma: wine.aroma.label(),
        rating: wine.rating,
    };
    let yaml =
        serde_yaml::to_string(&frontmatter).map_err(|err| CoreError::Storage(err.to_string()))?;

    let mut content = String::new();
    content.push_str("---\n");
    content.push_str(&yaml);
    content.push_str("---\n\n");
    content.push_str("# Descrizione\n");
    content.push_str(&narrative::description(wine));
    content.push_str("\n\n# Abbinamenti\n");
    content.push_str(&narrative::pairing(wine));
    content.push_str("\n\n# Conservazione\n");
    content.push_str(&narrative::storage(wine));
    content.push('\n');
    Ok(content)
}

/// File name used when exporting a wine card.
pub fn wine_file_name(wine: &Wine) -> String {
    let slug = slugify(&wine.name);
    if slug.is_empty() {
        format!("{}.md", wine.id)
    } else {
        format!("{slug}-{}.md", wine.id)
    }
}
