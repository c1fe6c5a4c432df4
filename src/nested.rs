use crate::matcher::MatchResult;
use crate::route::{LabelArgs, MetaObject, Params, QueryObject, Route};

use std::fmt;

/// Hard bound on the ancestor walk, independent of cycle detection.
const MAX_TRAIL_DEPTH: usize = 10;

/// A route linked to the routes that declare it as parent.
pub struct NestedRoute<'r, C> {
    pub route: &'r Route<C>,
    pub children: Vec<NestedRoute<'r, C>>,
}

impl<C> fmt::Debug for NestedRoute<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedRoute")
            .field("route", &self.route.path)
            .field("children", &self.children)
            .finish()
    }
}

/// Builds the parent/child forest of a flat table in one pass.
///
/// Routes without `parent_path` are roots; routes naming a parent that is
/// not in the table are dropped, not errored.
pub fn nested_routes<C>(routes: &[Route<C>]) -> Vec<NestedRoute<'_, C>> {
    routes
        .iter()
        .filter(|route| route.parent_path.is_none())
        .map(|root| attach_children(root, routes))
        .collect()
}

fn attach_children<'r, C>(route: &'r Route<C>, routes: &'r [Route<C>]) -> NestedRoute<'r, C> {
    let children = routes
        .iter()
        .filter(|child| child.parent_path.as_ref() == Some(&route.path))
        .map(|child| attach_children(child, routes))
        .collect();
    NestedRoute { route, children }
}

/// Ancestor labels from root to the matched route.
///
/// Each ancestor contributes its breadcrumb label, falling back to its
/// title; `context` is applied to the matched route only. The walk stops
/// quietly on a recurring pattern and is capped at [`MAX_TRAIL_DEPTH`]
/// entries as a second net.
pub(crate) fn breadcrumb_trail<C>(
    routes: &[Route<C>],
    found: &MatchResult<'_, C>,
    context: Option<&C>,
) -> Vec<String> {
    let mut trail = vec![found.breadcrumb(context)];

    let empty_params = Params::new();
    let empty_query = QueryObject::new();
    let empty_meta = MetaObject::new();

    let mut visited: Vec<&str> = vec![found.route.path.as_str()];
    let mut parent = found.route.parent_path.as_ref();

    while let Some(parent_path) = parent {
        if trail.len() >= MAX_TRAIL_DEPTH {
            break;
        }
        if visited.iter().any(|seen| *seen == parent_path.as_str()) {
            break;
        }
        let ancestor = match routes.iter().find(|route| &route.path == parent_path) {
            Some(route) => route,
            None => break,
        };
        let args = LabelArgs {
            params: &empty_params,
            query: &empty_query,
            meta: &empty_meta,
            context: None,
        };
        let label = match &ancestor.breadcrumb {
            Some(label) => label.render(&args),
            None => ancestor.title.render(&args),
        };
        trail.insert(0, label);
        visited.push(ancestor.path.as_str());
        parent = ancestor.parent_path.as_ref();
    }

    trail
}
