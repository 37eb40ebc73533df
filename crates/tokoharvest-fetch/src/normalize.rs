//! Normalization from raw wire reviews to the flat [`Review`] records.

use tokoharvest_core::products::Review;

use crate::types::RawReview;

/// Flattens one wire review entry into a [`Review`].
///
/// Absent text fields become empty strings, absent numeric fields become
/// zero, and the nested reply and like structures collapse to their single
/// interesting value.
#[must_use]
pub fn normalize_review(raw: RawReview) -> Review {
    Review {
        review_id: raw.id.unwrap_or_default(),
        variant_name: raw.variant_name.unwrap_or_default(),
        message: raw.message.unwrap_or_default(),
        rating: raw.product_rating.unwrap_or(0),
        review_time: raw.review_create_time.unwrap_or_default(),
        review_timestamp: raw.review_create_timestamp.unwrap_or(0),
        review_response: raw
            .review_response
            .and_then(|reply| reply.message)
            .unwrap_or_default(),
        like_count: raw.like_dislike.map_or(0, |likes| likes.total_like),
        bad_rating_reason: raw.bad_rating_reason.unwrap_or_default(),
    }
}
