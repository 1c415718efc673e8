use crate::source::Category;

const BUILTIN: &[(u32, &str)] = &[
    (9, "General Knowledge"),
    (10, "Entertainment: Books"),
    (11, "Entertainment: Film"),
    (12, "Entertainment: Music"),
    (13, "Entertainment: Musicals & Theatres"),
    (14, "Entertainment: Television"),
    (15, "Entertainment: Video Games"),
    (16, "Entertainment: Board Games"),
    (17, "Science & Nature"),
    (18, "Science: Computers"),
    (19, "Science: Mathematics"),
    (20, "Mythology"),
    (21, "Sports"),
    (22, "Geography"),
    (23, "History"),
    (24, "Politics"),
    (25, "Art"),
    (26, "Celebrities"),
    (27, "Animals"),
    (28, "Vehicles"),
    (29, "Entertainment: Comics"),
    (30, "Science: Gadgets"),
    (31, "Entertainment: Japanese Anime & Manga"),
    (32, "Entertainment: Cartoon & Animations"),
];

/// Known provider categories, used when the live list can't be fetched.
pub fn builtin_categories() -> Vec<Category> {
    let mut cats: Vec<Category> = BUILTIN
        .iter()
        .map(|(id, name)| Category {
            id: *id,
            name: name.to_string(),
        })
        .collect();
    cats.sort_by(|a, b| a.name.cmp(&b.name));
    cats
}

pub fn category_name(categories: &[Category], id: u32) -> Option<&str> {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_sorted_and_unique() {
        let cats = builtin_categories();
        assert_eq!(cats.len(), BUILTIN.len());
        assert!(cats.windows(2).all(|w| w[0].name <= w[1].name));
        let mut ids: Vec<u32> = cats.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), cats.len());
    }

    #[test]
    fn test_category_name_lookup() {
        let cats = builtin_categories();
        assert_eq!(category_name(&cats, 18), Some("Science: Computers"));
        assert_eq!(category_name(&cats, 999), None);
    }
}
