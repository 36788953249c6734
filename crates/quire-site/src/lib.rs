//! Page-data extraction for Quire.
//!
//! Turns a scanned [`RouteService`](quire_route::RouteService) into one
//! [`PageIndexInfo`](quire_route::PageIndexInfo) per route:
//!
//! 1. read the file and split frontmatter
//! 2. apply replace rules, flatten embedded components, strip imports
//! 3. parse once; take the title, outline and description from the tree
//! 4. strip images, link targets and (optionally) code, then stringify
//! 5. locate each outline heading in the resulting search content
//!
//! Records are attached to their routes, where the text exports in
//! [`llms_txt`] and [`llms_full_txt`] pick them up.

mod error;
mod flatten;
mod llms;
mod offset;
mod page_data;

pub use error::PageDataError;
pub use flatten::{AliasMap, ContentFlattener, IdentityFlattener, MdxFlattener};
pub use llms::{llms_full_txt, llms_txt, route_path_to_md_path};
pub use offset::resolve_char_indices;
pub use page_data::{ExtractPageDataOptions, extract_page_data, get_page_index_info_by_route};
