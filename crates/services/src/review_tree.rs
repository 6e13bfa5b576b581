//! # Review threads
//!
//! Turns the flat review rows of one movie into the nested shape the API
//! serializes. Rows are grouped by parent once, then the tree is built
//! top-down starting from the reviews without a parent.

use std::collections::HashMap;

use domains::{Review, ReviewId, ReviewNode};

/// Builds the review forest. Siblings keep their input order.
///
/// A review whose parent is missing from `reviews` is unreachable from any
/// root and does not appear in the output.
pub fn project(reviews: &[Review]) -> Vec<ReviewNode> {
    let mut by_parent: HashMap<Option<ReviewId>, Vec<&Review>> = HashMap::new();
    for review in reviews {
        by_parent.entry(review.parent).or_default().push(review);
    }
    children_of(None, &by_parent)
}

fn children_of(
    parent: Option<ReviewId>,
    by_parent: &HashMap<Option<ReviewId>, Vec<&Review>>,
) -> Vec<ReviewNode> {
    by_parent
        .get(&parent)
        .map(|group| {
            group
                .iter()
                .map(|review| ReviewNode {
                    name: review.name.clone(),
                    text: review.text.clone(),
                    children: children_of(Some(review.id), by_parent),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: ReviewId, parent: Option<ReviewId>) -> Review {
        Review {
            id,
            name: format!("R{id}"),
            email: format!("r{id}@example.com"),
            text: format!("text {id}"),
            parent,
            movie: 1,
        }
    }

    fn total(nodes: &[ReviewNode]) -> usize {
        nodes.iter().map(ReviewNode::size).sum()
    }

    #[test]
    fn no_reviews_project_to_nothing() {
        assert!(project(&[]).is_empty());
    }

    #[test]
    fn top_level_reviews_keep_input_order() {
        let reviews = [review(3, None), review(1, None), review(2, None)];
        let names: Vec<_> = project(&reviews).into_iter().map(|n| n.name).collect();
        assert_eq!(names, ["R3", "R1", "R2"]);
    }

    #[test]
    fn replies_nest_under_their_parent() {
        let reviews = [review(1, None), review(2, Some(1)), review(3, None)];
        let tree = project(&reviews);

        let expected = vec![
            ReviewNode {
                name: "R1".into(),
                text: "text 1".into(),
                children: vec![ReviewNode {
                    name: "R2".into(),
                    text: "text 2".into(),
                    children: vec![],
                }],
            },
            ReviewNode {
                name: "R3".into(),
                text: "text 3".into(),
                children: vec![],
            },
        ];
        assert_eq!(tree, expected);
    }

    #[test]
    fn reply_chain_of_depth_three() {
        let reviews = [review(1, None), review(2, Some(1)), review(3, Some(2))];
        let tree = project(&reviews);

        assert_eq!(tree.len(), 1);
        let second = &tree[0].children;
        assert_eq!(second.len(), 1);
        let third = &second[0].children;
        assert_eq!(third.len(), 1);
        assert!(third[0].children.is_empty());
        assert_eq!(third[0].name, "R3");
    }

    #[test]
    fn reply_listed_before_its_parent_is_still_nested() {
        let reviews = [review(2, Some(1)), review(1, None)];
        let tree = project(&reviews);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].name, "R2");
    }

    #[test]
    fn independent_trees_keep_every_review_exactly_once() {
        let reviews = [
            review(1, None),
            review(2, Some(1)),
            review(3, Some(1)),
            review(4, Some(3)),
            review(5, None),
            review(6, Some(5)),
            review(7, None),
        ];
        let tree = project(&reviews);

        assert_eq!(tree.len(), 3);
        assert_eq!(total(&tree), reviews.len());
        let replies: Vec<_> = tree[0].children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(replies, ["R2", "R3"]);
    }

    #[test]
    fn deep_chain_does_not_lose_nodes() {
        let mut reviews = vec![review(1, None)];
        reviews.extend((2..=200).map(|id| review(id, Some(id - 1))));
        let tree = project(&reviews);
        assert_eq!(tree.len(), 1);
        assert_eq!(total(&tree), 200);
    }

    #[test]
    fn orphaned_reply_is_omitted() {
        // parent 99 belongs to another movie
        let reviews = [review(1, None), review(2, Some(99))];
        let tree = project(&reviews);
        assert_eq!(tree.len(), 1);
        assert_eq!(total(&tree), 1);
    }
}
