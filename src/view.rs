use std::collections::HashMap;

use crate::models::Article;

/// Read-status filter applied per feed before search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Read,
    Unread,
}

impl Filter {
    fn keeps(self, article: &Article) -> bool {
        match self {
            Filter::All => true,
            Filter::Read => article.read,
            Filter::Unread => !article.read,
        }
    }
}

/// Apply a read-status filter to every feed's article list. Feeds keep
/// their entry even when the filter empties it.
pub fn filter_articles(
    articles_by_feed: &HashMap<String, Vec<Article>>,
    filter: Filter,
) -> HashMap<String, Vec<Article>> {
    articles_by_feed
        .iter()
        .map(|(feed_id, articles)| {
            let kept = articles
                .iter()
                .filter(|a| filter.keeps(a))
                .cloned()
                .collect();
            (feed_id.clone(), kept)
        })
        .collect()
}

/// Case-insensitive substring search on article titles. An empty query is
/// a passthrough. Applied after read/unread filtering, recomputed on
/// every keystroke.
pub fn search_by_title(articles: &[Article], query: &str) -> Vec<Article> {
    if query.is_empty() {
        return articles.to_vec();
    }
    let needle = query.to_lowercase();
    articles
        .iter()
        .filter(|a| a.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, read: bool) -> Article {
        Article {
            guid: title.to_owned(),
            title: title.to_owned(),
            pub_date: String::new(),
            link: String::new(),
            content: String::new(),
            feed_id: "f1".to_owned(),
            read,
        }
    }

    #[test]
    fn filter_all_is_passthrough() {
        let mut map = HashMap::new();
        map.insert("f1".to_owned(), vec![article("a", true), article("b", false)]);
        let filtered = filter_articles(&map, Filter::All);
        assert_eq!(filtered["f1"].len(), 2);
    }

    #[test]
    fn filter_read_and_unread_partition() {
        let mut map = HashMap::new();
        map.insert("f1".to_owned(), vec![article("a", true), article("b", false)]);

        let read = filter_articles(&map, Filter::Read);
        assert_eq!(read["f1"].len(), 1);
        assert!(read["f1"][0].read);

        let unread = filter_articles(&map, Filter::Unread);
        assert_eq!(unread["f1"].len(), 1);
        assert!(!unread["f1"][0].read);
    }

    #[test]
    fn empty_feed_keeps_its_entry() {
        let mut map = HashMap::new();
        map.insert("f1".to_owned(), vec![article("a", false)]);
        let filtered = filter_articles(&map, Filter::Read);
        assert!(filtered.contains_key("f1"));
        assert!(filtered["f1"].is_empty());
    }

    #[test]
    fn search_is_case_insensitive_on_title_only() {
        let articles = vec![article("Apollo launch", false), article("Weather update", false)];
        let hits = search_by_title(&articles, "apollo");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Apollo launch");
    }

    #[test]
    fn empty_query_returns_everything() {
        let articles = vec![article("Apollo launch", false), article("Weather update", false)];
        assert_eq!(search_by_title(&articles, "").len(), 2);
    }
}
