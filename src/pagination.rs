use serde::Serialize;

pub fn num_pages(total: i64, per_page: i64) -> i64 {
    if total <= 0 {
        1
    } else {
        (total + per_page - 1) / per_page
    }
}

pub fn clamp_page(requested: i64, num_pages: i64) -> i64 {
    requested.max(1).min(num_pages)
}

pub fn offset(page: i64, per_page: i64) -> i64 {
    (page - 1) * per_page
}

#[derive(Debug, Serialize)]
pub struct PageLinks {
    pub prev: Option<String>,
    pub next: Option<String>,
}

fn page_url(base: &str, page: i64, extra: &[(&str, &str)]) -> Option<String> {
    let mut params: Vec<(&str, String)> = Vec::with_capacity(extra.len() + 1);
    for (key, value) in extra {
        params.push((key, (*value).to_owned()));
    }
    params.push(("page", page.to_string()));
    let query = serde_urlencoded::to_string(&params).ok()?;
    Some(format!("{base}?{query}"))
}

pub fn page_links(base: &str, page: i64, num_pages: i64, extra: &[(&str, &str)]) -> PageLinks {
    PageLinks {
        prev: (page > 1).then(|| page_url(base, page - 1, extra)).flatten(),
        next: (page < num_pages)
            .then(|| page_url(base, page + 1, extra))
            .flatten(),
    }
}

/// Inserts the values every paginated list template expects.
pub fn insert_page_context(
    ctx: &mut tera::Context,
    base: &str,
    page: i64,
    num_pages: i64,
    extra: &[(&str, &str)],
) {
    let links = page_links(base, page, num_pages, extra);
    ctx.insert("page", &page);
    ctx.insert("num_pages", &num_pages);
    ctx.insert("prev_url", &links.prev);
    ctx.insert("next_url", &links.next);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(num_pages(0, 5), 1);
        assert_eq!(num_pages(1, 5), 1);
        assert_eq!(num_pages(5, 5), 1);
        assert_eq!(num_pages(6, 5), 2);
        assert_eq!(num_pages(11, 5), 3);
    }

    #[test]
    fn pages_clamp_into_range() {
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(-4, 3), 1);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(9, 3), 3);
    }

    #[test]
    fn links_only_exist_for_reachable_pages() {
        let links = page_links("/dishes", 1, 1, &[]);
        assert_eq!(links.prev, None);
        assert_eq!(links.next, None);

        let links = page_links("/dishes", 2, 3, &[]);
        assert_eq!(links.prev.as_deref(), Some("/dishes?page=1"));
        assert_eq!(links.next.as_deref(), Some("/dishes?page=3"));
    }

    #[test]
    fn links_keep_filter_parameters() {
        let links = page_links("/ingredients", 2, 3, &[("ingredient_type", "Dried herbs")]);
        assert_eq!(
            links.next.as_deref(),
            Some("/ingredients?ingredient_type=Dried+herbs&page=3")
        );
    }
}
