//! Bundled seed data.
//!
//! Used to initialize an empty store and as the offline fallback for nearby
//! lookups. Every call builds fresh values; nothing here is shared state.

use crate::model::geo::GeoCoordinate;
use crate::model::ledger_item::LedgerItem;
use crate::model::place::PlaceRecord;
use crate::model::profile::UserProfile;
use crate::repo::ledger_repo::LedgerSeed;

pub const DEMO_USER_ID: &str = "user-1";

pub fn demo_profile() -> UserProfile {
    UserProfile::new(DEMO_USER_ID, "Ahmet Yılmaz")
        .with_business_name("Yılmaz Cafe")
        .with_totals(1200, 450)
}

/// Daily missions, in display order.
pub fn demo_tasks() -> Vec<LedgerItem> {
    vec![
        LedgerItem::task(
            "task-1",
            "Günlük işletme kontrolü",
            "Günlük satışları ve stokları kontrol edin",
            50,
            25,
        )
        .with_due_date("2025-06-09"),
        LedgerItem::task(
            "task-2",
            "Sosyal medya paylaşımı",
            "İşletmeniz için günlük sosyal medya içeriği paylaşın",
            30,
            15,
        )
        .with_due_date("2025-06-09"),
        LedgerItem::task(
            "task-3",
            "Müşteri geri bildirimi",
            "En az 3 müşteriden geri bildirim alın",
            80,
            40,
        ),
    ]
}

pub fn demo_achievements() -> Vec<LedgerItem> {
    vec![
        LedgerItem::achievement("ach-1", "İlk Adım", "Uygulamaya hoş geldiniz!", 100, 50)
            .with_icon("award")
            .already_completed(),
        LedgerItem::achievement("ach-2", "İşletme Uzmanı", "5 iş görevi tamamlayın", 300, 150)
            .with_icon("briefcase"),
        LedgerItem::achievement(
            "ach-3",
            "Sosyal Ağ",
            "3 sosyal medya hesabını bağlayın",
            200,
            100,
        )
        .with_icon("share-alt"),
    ]
}

pub fn demo_seed() -> LedgerSeed {
    let mut items = demo_tasks();
    items.extend(demo_achievements());
    LedgerSeed {
        profile: demo_profile(),
        items,
    }
}

/// Offline restaurant catalogue around the default location.
pub fn demo_restaurants() -> Vec<PlaceRecord> {
    const FOOD: [&str; 3] = ["restaurant", "food", "establishment"];

    vec![
        PlaceRecord::new(
            "mock_1",
            "Pizza Palace",
            "Downtown Area",
            GeoCoordinate::new(41.0082, 28.9784),
        )
        .with_rating(4.5)
        .with_price_level(2)
        .with_types(FOOD)
        .with_business_status("OPERATIONAL"),
        PlaceRecord::new(
            "mock_2",
            "Sushi Master",
            "City Center",
            GeoCoordinate::new(41.0100, 28.9800),
        )
        .with_rating(4.8)
        .with_price_level(3)
        .with_types(FOOD)
        .with_business_status("OPERATIONAL"),
        PlaceRecord::new(
            "mock_3",
            "Burger House",
            "Main Street",
            GeoCoordinate::new(41.0050, 28.9750),
        )
        .with_rating(4.2)
        .with_price_level(1)
        .with_types(FOOD)
        .with_business_status("OPERATIONAL"),
        PlaceRecord::new(
            "mock_4",
            "Turkish Delight",
            "Historic District",
            GeoCoordinate::new(41.0120, 28.9820),
        )
        .with_rating(4.6)
        .with_price_level(2)
        .with_types(FOOD)
        .with_business_status("OPERATIONAL"),
        PlaceRecord::new(
            "mock_5",
            "Coffee Corner",
            "Business District",
            GeoCoordinate::new(41.0070, 28.9770),
        )
        .with_rating(4.3)
        .with_price_level(1)
        .with_types(["cafe", "restaurant", "food", "establishment"])
        .with_business_status("OPERATIONAL"),
    ]
}
