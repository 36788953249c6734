//! Plain-text site exports for language models.
//!
//! Both exports read records already attached to the route table by
//! [`extract_page_data`](crate::extract_page_data); nothing is re-parsed.

use std::fmt::Write;

use quire_route::{PageIndexInfo, RoutePage, RouteService};

/// Markdown URL of a route (`/guide/` -> `/guide/index.md`).
#[must_use]
pub fn route_path_to_md_path(route_path: &str) -> String {
    if route_path.ends_with('/') {
        format!("{route_path}index.md")
    } else {
        format!("{route_path}.md")
    }
}

/// Index of every extracted markdown page, one link per line.
///
/// ```text
/// # Site
///
/// - [Guide](/guide/index.md): Getting started
/// ```
#[must_use]
pub fn llms_txt(routes: &RouteService, title: &str) -> String {
    let mut out = format!("# {title}\n\n");
    for (page, info) in extracted_pages(routes) {
        let label = if info.title.is_empty() {
            page.meta.page_name()
        } else {
            info.title.clone()
        };
        write!(out, "- [{label}]({})", route_path_to_md_path(&info.route_path)).unwrap();
        if let Some(description) = &info.description {
            write!(out, ": {description}").unwrap();
        }
        out.push('\n');
    }
    out
}

/// Full flattened source of every extracted markdown page.
///
/// Each page is preceded by a `url:` header block.
#[must_use]
pub fn llms_full_txt(routes: &RouteService) -> String {
    let sections: Vec<String> = extracted_pages(routes)
        .map(|(_, info)| {
            format!(
                "---\nurl: {}\n---\n\n{}\n",
                route_path_to_md_path(&info.route_path),
                info.flatten_content.trim()
            )
        })
        .collect();
    sections.join("\n")
}

fn extracted_pages(
    routes: &RouteService,
) -> impl Iterator<Item = (&RoutePage, &PageIndexInfo)> {
    routes.get_routes().iter().filter_map(|page| {
        let info = page.page_index_info()?;
        page.meta.is_markdown().then_some((page, info.as_ref()))
    })
}
