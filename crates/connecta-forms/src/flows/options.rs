//! Option lists shared by several flows.

use crate::wizard::{options, FieldOption};

pub const OTHER: &str = "Other";

pub fn education_degrees() -> Vec<FieldOption> {
    options(&[
        ("high-school", "High School"),
        ("associate", "Associate Degree"),
        ("bachelor", "Bachelor's Degree"),
        ("master", "Master's Degree"),
        ("phd", "Ph.D."),
        ("other", "Other"),
    ])
}

/// Tournament registrations do not offer associate degrees.
pub fn tournament_degrees() -> Vec<FieldOption> {
    education_degrees()
        .into_iter()
        .filter(|o| o.value != "associate")
        .collect()
}

pub fn interests() -> Vec<FieldOption> {
    options(&[
        ("technology", "Technology"),
        ("design", "Design"),
        ("business", "Business"),
        ("marketing", "Marketing"),
        ("education", "Education"),
        ("healthcare", "Healthcare"),
        ("gaming", "Gaming"),
        ("other", "Other"),
    ])
}

pub fn tournament_games() -> Vec<FieldOption> {
    options(&[
        ("valorant", "Valorant"),
        ("league-of-legends", "League of Legends"),
        ("fortnite", "Fortnite"),
        ("fc26", "FC26"),
        ("tekken8", "Tekken 8"),
        ("pubg-mobile", "PUBG Mobile"),
        ("clash-royale", "Clash Royale"),
        ("retro-games", "Retro Games"),
        ("other", "Other"),
    ])
}

pub fn governorates() -> Vec<FieldOption> {
    options(&[
        ("cairo", "Cairo"),
        ("giza", "Giza"),
        ("alexandria", "Alexandria"),
        ("qalyubia", "Qalyubia"),
        ("dakahlia", "Dakahlia"),
        ("sharqia", "Sharqia"),
        ("gharbia", "Gharbia"),
        ("monufia", "Monufia"),
        ("beheira", "Beheira"),
        ("kafr-el-sheikh", "Kafr El Sheikh"),
        ("damietta", "Damietta"),
        ("port-said", "Port Said"),
        ("ismailia", "Ismailia"),
        ("suez", "Suez"),
        ("north-sinai", "North Sinai"),
        ("south-sinai", "South Sinai"),
        ("faiyum", "Faiyum"),
        ("beni-suef", "Beni Suef"),
        ("minya", "Minya"),
        ("asyut", "Asyut"),
        ("sohag", "Sohag"),
        ("qena", "Qena"),
        ("luxor", "Luxor"),
        ("aswan", "Aswan"),
        ("red-sea", "Red Sea"),
        ("new-valley", "New Valley"),
        ("matrouh", "Matrouh"),
    ])
}
