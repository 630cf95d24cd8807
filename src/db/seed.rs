use crate::db::Store;
use crate::models::NewDestination;

struct SampleDestination {
    name: &'static str,
    country: &'static str,
    description: &'static str,
    rating: i64,
    image_url: &'static str,
    popular_tag: &'static str,
    recommended_days: &'static str,
    price_from: i64,
}

const SAMPLE_DESTINATIONS: &[SampleDestination] = &[
    SampleDestination {
        name: "Bali",
        country: "Indonesia",
        description: "Tropical paradise with beautiful beaches and rich cultural heritage.",
        rating: 48,
        image_url: "https://images.unsplash.com/photo-1537996194471-e657df975ab4",
        popular_tag: "Tropical Paradise",
        recommended_days: "5-7 days",
        price_from: 899,
    },
    SampleDestination {
        name: "Santorini",
        country: "Greece",
        description: "Stunning island with white-washed buildings and breathtaking sea views.",
        rating: 49,
        image_url: "https://images.unsplash.com/photo-1570077188670-e3a8d69ac5ff",
        popular_tag: "Breathtaking Views",
        recommended_days: "4-6 days",
        price_from: 1099,
    },
    SampleDestination {
        name: "Tokyo",
        country: "Japan",
        description: "Vibrant metropolis blending ultramodern with traditional.",
        rating: 47,
        image_url: "https://images.unsplash.com/photo-1503899036084-c55cdd92da26",
        popular_tag: "Urban Adventure",
        recommended_days: "7-10 days",
        price_from: 1299,
    },
    SampleDestination {
        name: "Paris",
        country: "France",
        description: "City of light known for its art, fashion, and cuisine.",
        rating: 48,
        image_url: "https://images.unsplash.com/photo-1502602898657-3e91760cbb34",
        popular_tag: "Romantic Getaway",
        recommended_days: "5-7 days",
        price_from: 999,
    },
    SampleDestination {
        name: "New York",
        country: "USA",
        description: "The city that never sleeps with iconic landmarks and cultural diversity.",
        rating: 46,
        image_url: "https://images.unsplash.com/photo-1496442226666-8d4d0e62e6e9",
        popular_tag: "City Explorer",
        recommended_days: "6-8 days",
        price_from: 1199,
    },
    SampleDestination {
        name: "Maldives",
        country: "Maldives",
        description: "Tropical paradise with pristine beaches and crystal-clear waters.",
        rating: 49,
        image_url: "https://images.unsplash.com/photo-1573843981267-be1999ff37cd",
        popular_tag: "Luxury Retreat",
        recommended_days: "7-10 days",
        price_from: 1899,
    },
];

/// Loads the sample destinations into an empty store. Returns how many were inserted.
pub fn seed_destinations(store: &dyn Store) -> anyhow::Result<usize> {
    if !store.get_all_destinations()?.is_empty() {
        return Ok(0);
    }

    for sample in SAMPLE_DESTINATIONS {
        store.create_destination(NewDestination {
            name: sample.name.to_string(),
            country: sample.country.to_string(),
            description: sample.description.to_string(),
            rating: sample.rating,
            image_url: sample.image_url.to_string(),
            popular_tag: Some(sample.popular_tag.to_string()),
            recommended_days: Some(sample.recommended_days.to_string()),
            price_from: Some(sample.price_from),
            featured: true,
        })?;
    }

    tracing::info!(count = SAMPLE_DESTINATIONS.len(), "seeded sample destinations");
    Ok(SAMPLE_DESTINATIONS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;

    #[test]
    fn test_seed_runs_once() {
        let store = SqliteStore::open(":memory:").unwrap();
        assert_eq!(seed_destinations(&store).unwrap(), 6);
        assert_eq!(seed_destinations(&store).unwrap(), 0);

        let all = store.get_all_destinations().unwrap();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0].id, 1);
        assert_eq!(all[0].name, "Bali");
        assert!(all.iter().all(|d| (0..=50).contains(&d.rating)));
    }
}
