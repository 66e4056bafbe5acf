// ABOUTME: Contact block of the public pet page, shown only for pets reported lost
// ABOUTME: Builds WhatsApp and mailto links from the owner contact fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use central_vet_core::models::PetSummary;

const WHATSAPP_BASE: &str = "https://wa.me/";

/// Owner contact for a lost pet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LostPetContact {
    /// Owner display name
    pub owner_name: Option<String>,
    /// Phone as entered by the owner
    pub phone: Option<String>,
    /// `https://wa.me/<digits>` link
    pub whatsapp_url: Option<String>,
    /// `mailto:` link
    pub mailto_url: Option<String>,
}

impl LostPetContact {
    /// Contact block for `pet`; `None` unless the pet is lost
    #[must_use]
    pub fn for_pet(pet: &PetSummary) -> Option<Self> {
        if !pet.is_lost() {
            return None;
        }
        let owner = &pet.profile().owner;
        let phone = owner.phone.clone().filter(|p| !p.trim().is_empty());
        let email = owner.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
        Some(Self {
            owner_name: owner.name.clone(),
            whatsapp_url: phone.as_deref().and_then(whatsapp_url),
            mailto_url: email.map(|e| format!("mailto:{e}")),
            phone,
        })
    }
}

/// WhatsApp link for a phone number, ignoring everything but digits
#[must_use]
pub fn whatsapp_url(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    Some(format!("{WHATSAPP_BASE}{digits}"))
}
