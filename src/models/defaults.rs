//! Built-in records shown when the row-store is unreachable or empty on first load.

use chrono::NaiveDate;

use crate::models::domain::{Lead, LeadCriteria, LeadStatus, Property, PropertyType};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn default_leads() -> Vec<Lead> {
    vec![
        Lead {
            id: "l1".to_string(),
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            status: LeadStatus::Qualified,
            last_contacted: date(2024, 5, 20),
            criteria: LeadCriteria {
                budget_min: 1_500_000.0,
                budget_max: 2_500_000.0,
                location: "Malibu".to_string(),
                min_bedrooms: 4,
                min_bathrooms: 4.0,
                preferred_type: "Villa".to_string(),
                lifestyle: "Luxury seeker, needs ocean view and privacy.".to_string(),
                essential_features: strings(&["Ocean View", "Infinity Pool"]),
            },
        },
        Lead {
            id: "l2".to_string(),
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            status: LeadStatus::Contacted,
            last_contacted: date(2024, 5, 22),
            criteria: LeadCriteria {
                budget_min: 800_000.0,
                budget_max: 1_200_000.0,
                location: "NY Suburbs".to_string(),
                min_bedrooms: 3,
                min_bathrooms: 2.0,
                preferred_type: "House".to_string(),
                lifestyle: "Family-oriented, school district is priority.".to_string(),
                essential_features: strings(&["Large Garden", "Double Garage"]),
            },
        },
        Lead {
            id: "l3".to_string(),
            name: "Peter Jones".to_string(),
            email: "peter@tech.com".to_string(),
            status: LeadStatus::New,
            last_contacted: date(2024, 5, 23),
            criteria: LeadCriteria {
                budget_min: 500_000.0,
                budget_max: 900_000.0,
                location: "Austin".to_string(),
                min_bedrooms: 2,
                min_bathrooms: 2.0,
                preferred_type: "Apartment".to_string(),
                lifestyle: "Urban professional, loves high-tech amenities.".to_string(),
                essential_features: strings(&["Smart Home", "High Ceilings"]),
            },
        },
    ]
}

pub fn default_properties() -> Vec<Property> {
    vec![
        Property {
            id: "1".to_string(),
            name: "Azure Bay Villa".to_string(),
            price: 2_450_000.0,
            location: "Malibu, CA".to_string(),
            property_type: PropertyType::Villa,
            bedrooms: 5,
            bathrooms: 4.5,
            sqft: 4200,
            amenities: strings(&["Ocean View", "Infinity Pool", "Home Theater", "Smart Home"]),
            description: "A coastal retreat with floor-to-ceiling windows and direct beach access."
                .to_string(),
            image_url: "https://images.unsplash.com/photo-1613490493576-7fde63acd811?w=800"
                .to_string(),
        },
        Property {
            id: "2".to_string(),
            name: "The Skyline Penthouse".to_string(),
            price: 1_850_000.0,
            location: "Manhattan, NY".to_string(),
            property_type: PropertyType::Penthouse,
            bedrooms: 3,
            bathrooms: 3.0,
            sqft: 2800,
            amenities: strings(&["Private Rooftop", "Gym", "Concierge", "Wine Cellar"]),
            description: "Modern urban living in the heart of the city with 360-degree views."
                .to_string(),
            image_url: "https://images.unsplash.com/photo-1522708323590-d24dbb6b0267?w=800"
                .to_string(),
        },
        Property {
            id: "3".to_string(),
            name: "Maplewood Family Estate".to_string(),
            price: 950_000.0,
            location: "Scarsdale, NY".to_string(),
            property_type: PropertyType::House,
            bedrooms: 4,
            bathrooms: 3.5,
            sqft: 3200,
            amenities: strings(&["Large Garden", "Double Garage", "Top School District"]),
            description: "A colonial home on a quiet street, close to top-rated schools.".to_string(),
            image_url: "https://images.unsplash.com/photo-1570129477492-45c003edd2be?w=800"
                .to_string(),
        },
        Property {
            id: "4".to_string(),
            name: "Cedar Ridge Lodge".to_string(),
            price: 1_200_000.0,
            location: "Aspen, CO".to_string(),
            property_type: PropertyType::House,
            bedrooms: 4,
            bathrooms: 3.0,
            sqft: 3100,
            amenities: strings(&["Ski-in/Ski-out", "Hot Tub", "Stone Fireplace"]),
            description: "Rustic luxury and modern comfort in a mountain-side retreat.".to_string(),
            image_url: "https://images.unsplash.com/photo-1518780664697-55e3ad937233?w=800"
                .to_string(),
        },
        Property {
            id: "5".to_string(),
            name: "Modernist Loft".to_string(),
            price: 750_000.0,
            location: "Austin, TX".to_string(),
            property_type: PropertyType::Apartment,
            bedrooms: 2,
            bathrooms: 2.0,
            sqft: 1500,
            amenities: strings(&["Industrial Finish", "High Ceilings", "Solar Panels"]),
            description: "Loft in the creative district with eco-friendly features.".to_string(),
            image_url: "https://images.unsplash.com/photo-1502672260266-1c1ef2d93688?w=800"
                .to_string(),
        },
    ]
}
