//! Game developer exhibition application, eight sections.

use serde_json::{Map, Value};

use super::options::{governorates, OTHER};
use super::{sanitized_phone, to_json};
use crate::application::submission::RecordMapping;
use crate::domain::rules::REQUIRED;
use crate::domain::{AgeRange, Condition, FormState, Rule};
use crate::wizard::{options, FieldKind, FieldSpec, FlowDefinition, StepPlan, StepSpec};

pub const KEY: &str = "exhibition";
pub const COLLECTION: &str = "game_developers";
pub const DRAFT_KEY: &str = "connecta2025_registration_draft";

/// Multi-selects offering an "Other" entry and their free-text sidecar.
const ARRAY_SIDECARS: &[(&str, &str)] = &[
    ("gameGenre", "gameGenreOther"),
    ("targetPlatforms", "targetPlatformsOther"),
    ("gameAvailability", "gameAvailabilityOther"),
    ("monetizationModel", "monetizationModelOther"),
    ("fundingSource", "fundingSourceOther"),
    ("targetAudience", "targetAudienceOther"),
];

/// Single-value selects whose "Other" answer is replaced by the sidecar text.
const MERGED_SIDECARS: &[(&str, &str)] = &[("hearAbout", "hearAboutOther")];

const URL_FIELDS: &[(&str, &str, &str)] = &[
    ("websiteUrl", "Website/Portfolio URL", "https://yourwebsite.com"),
    ("facebookUrl", "Facebook Page", "https://facebook.com/yourpage"),
    ("instagramUrl", "Instagram", "https://instagram.com/yourprofile"),
    ("twitterUrl", "Twitter/X", "https://twitter.com/yourhandle"),
    ("youtubeUrl", "YouTube Channel", "https://youtube.com/@yourchannel"),
    ("tiktokUrl", "TikTok", "https://tiktok.com/@yourprofile"),
    ("discordUrl", "Discord Community", "https://discord.gg/yourserver"),
    ("otherSocialUrl", "Other Social Media", "https://..."),
];

fn select(name: &str, label: &str, pairs: &[(&str, &str)]) -> FieldSpec {
    FieldSpec::new(name, label, FieldKind::Select, Rule::required_choice(REQUIRED)).with_options(options(pairs))
}

fn multi(name: &str, label: &str, required: bool, pairs: &[(&str, &str)]) -> FieldSpec {
    let rule = if required { Rule::required_many(REQUIRED) } else { Rule::Optional };
    FieldSpec::new(name, label, FieldKind::MultiSelect, rule).with_options(options(pairs))
}

fn sidecar(parent: &str, name: &str, label: &str) -> FieldSpec {
    let when = Condition::includes(parent, OTHER);
    FieldSpec::new(name, label, FieldKind::Text, Rule::required_when(when.clone(), REQUIRED))
        .visible_when(when)
}

fn text(name: &str, label: &str, placeholder: &str) -> FieldSpec {
    FieldSpec::new(name, label, FieldKind::Text, Rule::required_text(REQUIRED)).with_placeholder(placeholder)
}

pub fn definition() -> FlowDefinition {
    let mut fields = vec![
        // Basic information
        text("studioName", "Studio/Developer Name", "Enter your studio or developer name"),
        text("contactPerson", "Contact Person", "Full name of primary contact"),
        FieldSpec::new("email", "Email Address", FieldKind::Email, Rule::Email)
            .with_placeholder("your.email@example.com"),
        FieldSpec::new("phoneNumber", "Phone Number (with country code)", FieldKind::Phone, Rule::Phone)
            .with_placeholder("+20 123 456 7890"),
        FieldSpec::new("studioLocation", "Studio Location", FieldKind::Select, Rule::required_choice(REQUIRED))
            .with_options(governorates()),
        select("studioType", "Studio Type", &[
            ("individual", "Individual Indie Developer"),
            ("small", "Small Studio (2-5 members)"),
            ("medium", "Medium Studio (6-15 members)"),
            ("established", "Established Studio (15+ members)"),
        ]),
        select("yearsOfOperation", "Years of Operation", &[
            ("less-1", "Less than 1 year"),
            ("1-2", "1-2 years"),
            ("3-5", "3-5 years"),
            ("5plus", "More than 5 years"),
        ]),
        // Game information
        text("gameTitle", "Game Title", "Enter your game title"),
        multi("gameGenre", "Game Genre", true, &[
            ("action-adventure", "Action/Adventure"),
            ("rpg", "RPG (Role-Playing Game)"),
            ("strategy", "Strategy"),
            ("puzzle", "Puzzle"),
            ("platformer", "Platformer"),
            ("simulation", "Simulation"),
            ("sports", "Sports"),
            ("racing", "Racing"),
            ("fighting", "Fighting"),
            ("horror", "Horror"),
            ("educational", "Educational"),
            ("vr-ar", "VR/AR"),
            ("mobile-casual", "Mobile Casual"),
            ("card", "Card Games"),
            ("board", "Board Games"),
            (OTHER, "Other"),
        ]),
        sidecar("gameGenre", "gameGenreOther", "Please specify other genre"),
        multi("targetPlatforms", "Target Platform(s)", true, &[
            ("pc-windows", "PC (Windows)"),
            ("pc-mac", "PC (Mac)"),
            ("pc-linux", "PC (Linux)"),
            ("playstation", "PlayStation"),
            ("xbox", "Xbox"),
            ("mobile-ios", "Mobile (iOS)"),
            ("mobile-android", "Mobile (Android)"),
            ("vr-headsets", "VR Headsets"),
            ("web-browser", "Web Browser"),
            (OTHER, "Other"),
        ]),
        sidecar("targetPlatforms", "targetPlatformsOther", "Please specify other platform"),
        select("gameDevelopmentStatus", "Game Development Status", &[
            ("fully-released", "Fully Released (commercially available)"),
            ("soft-launch", "Soft Launch (limited release)"),
            ("release-candidate", "Release Candidate (completed, pending launch)"),
            ("not-applicable", "Not applicable"),
        ]),
        FieldSpec::new("releaseDate", "Release Date (if already released)", FieldKind::Date, Rule::Optional),
        multi("gameAvailability", "Where is your game currently available?", false, &[
            ("steam", "Steam"),
            ("epic", "Epic Games Store"),
            ("playstation-store", "PlayStation Store"),
            ("xbox-store", "Xbox Store"),
            ("google-play", "Google Play Store"),
            ("app-store", "Apple App Store"),
            ("own-website", "Own Website"),
            ("not-released", "Not yet released"),
            (OTHER, "Other"),
        ]),
        sidecar("gameAvailability", "gameAvailabilityOther", "Please specify other availability"),
        // Business readiness
        select("registeredBusiness", "Do you have a registered business entity in Egypt?", &[
            ("company", "Yes, registered company"),
            ("freelancer", "Yes, registered freelancer/sole proprietorship"),
            ("in-process", "No, but in process"),
            ("no", "No"),
        ]),
        multi("monetizationModel", "Monetization Model", false, &[
            ("premium", "Premium/Paid Game"),
            ("f2p-iap", "Free-to-Play with In-App Purchases"),
            ("f2p-ads", "Free-to-Play with Ads"),
            ("subscription", "Subscription Model"),
            ("dlc", "DLC/Expansion Packs"),
            ("not-monetized", "Not yet monetized"),
            (OTHER, "Other"),
        ]),
        sidecar("monetizationModel", "monetizationModelOther", "Please specify other monetization model"),
        select("totalRevenue", "Total Revenue Generated (if applicable)", &[
            ("no-revenue", "No revenue yet"),
            ("less-50k", "Less than EGP 50,000"),
            ("50k-200k", "EGP 50,000-200,000"),
            ("200k-500k", "EGP 200,000-500,000"),
            ("500k-1m", "EGP 500,000-1,000,000"),
            ("1m-plus", "More than EGP 1,000,000"),
            ("not-disclose", "Prefer not to disclose"),
        ]),
        multi("fundingSource", "Current Development Funding Source", false, &[
            ("self-funded", "Self-funded/Bootstrapped"),
            ("angel", "Angel Investors"),
            ("vc", "Venture Capital"),
            ("grant", "Government Grant"),
            ("crowdfunding", "Crowdfunding"),
            ("publisher", "Publisher Deal"),
            ("previous-games", "Revenue from Previous Games"),
            (OTHER, "Other"),
        ]),
        sidecar("fundingSource", "fundingSourceOther", "Please specify other funding source"),
        select("businessPlan", "Do you have a business plan for your game/studio?", &[
            ("comprehensive", "Yes, comprehensive business plan"),
            ("basic", "Yes, basic plan"),
            ("working", "Working on it"),
            ("no", "No"),
        ]),
        select("seekingInvestment", "Are you currently seeking investment or publishing deals?", &[
            ("actively", "Yes, actively seeking"),
            ("open", "Open to opportunities"),
            ("not-now", "Not at this time"),
            ("secured", "Already secured"),
        ]),
        // Marketing and press
        select("pressKit", "Do you have a press kit prepared?", &[
            ("complete", "Yes, complete press kit available"),
            ("partial", "Partial press kit (some materials ready)"),
            ("can-prepare", "No, but can prepare before event"),
            ("no", "No"),
        ]),
        multi("marketingMaterials", "Marketing Materials Available", false, &[
            ("trailer", "Game Trailer/Teaser Video"),
            ("screenshots", "Screenshots (high-resolution)"),
            ("logo", "Logo and Key Art"),
            ("fact-sheet", "Fact Sheet"),
            ("bios", "Developer Bios"),
            ("press-release", "Press Release"),
            ("social-media", "Social Media Presence"),
            ("website", "Website"),
            ("none", "None yet"),
        ]),
    ];

    fields.extend(URL_FIELDS.iter().map(|(name, label, placeholder)| {
        FieldSpec::new(name, label, FieldKind::Url, Rule::Url { required: false }).with_placeholder(placeholder)
    }));

    fields.extend([
        // Exhibition and demo
        multi("exhibitionSetup", "Exhibition Setup Requirements", false, &[
            ("pc-laptop", "PC/Laptop (we will provide our own)"),
            ("console", "Gaming Console (we will provide our own)"),
            ("monitor", "Monitor/TV Screen (specify size needed in comments)"),
            ("vr", "VR Headset (we will provide our own)"),
            ("internet", "Internet Connection (specify speed needed)"),
            ("sound", "Sound System/Headphones"),
            ("controllers", "Controllers/Gamepads"),
            ("special", "Special Hardware (please specify in comments)"),
            ("power", "Power outlets (specify number needed)"),
        ]),
        FieldSpec::new(
            "exhibitionSetupComments",
            "Exhibition Setup Comments/Specifications",
            FieldKind::TextArea,
            Rule::Optional,
        ),
        select("demoBuildStatus", "Demo Build Status", &[
            ("ready-now", "Stable demo build ready now"),
            ("ready-mid-nov", "Demo build ready by mid-November"),
            ("1-2-weeks", "Need 1-2 weeks to prepare demo build"),
            ("not-ready", "Not ready"),
        ]),
        select("demoDuration", "Demo Duration per Player", &[
            ("5-10", "5-10 minutes"),
            ("10-15", "10-15 minutes"),
            ("15-20", "15-20 minutes"),
            ("20-30", "20-30 minutes"),
            ("30plus", "30+ minutes"),
        ]),
        select("gamePlayability", "Is your game playable by general public without extensive tutorials?", &[
            ("easy", "Yes, easy to pick up and play"),
            ("brief", "Yes, with brief 1-2 minute explanation"),
            ("5-10-tutorial", "Requires 5-10 minute tutorial"),
            ("complex", "Complex, requires significant guidance"),
        ]),
        FieldSpec::new("playerStatistics", "Player Statistics (if applicable)", FieldKind::TextArea, Rule::Optional),
        select("previousExhibition", "Previous Exhibition Experience", &[
            ("gaming", "Yes, exhibited at gaming events before"),
            ("tech", "Yes, exhibited at tech events (non-gaming)"),
            ("first-time", "First time exhibiting"),
            ("no", "No experience"),
        ]),
        // Motivation and vision
        FieldSpec::new(
            "motivationWhy",
            "Why do you want to exhibit at Connecta?",
            FieldKind::TextArea,
            Rule::WordLimit { max: 200, required: true },
        ),
        FieldSpec::new(
            "gameUniqueness",
            "What makes your game unique?",
            FieldKind::TextArea,
            Rule::WordLimit { max: 300, required: true },
        ),
        multi("targetAudience", "Target Audience", true, &[
            ("children", "Children (under 12)"),
            ("teenagers", "Teenagers (13-17)"),
            ("young-adults", "Young Adults (18-25)"),
            ("adults", "Adults (26-40)"),
            ("all-ages", "All Ages"),
            ("casual", "Casual Gamers"),
            ("core", "Core Gamers"),
            (OTHER, "Specific demographic"),
        ]),
        sidecar("targetAudience", "targetAudienceOther", "Please specify specific demographic"),
        // Required uploads
        FieldSpec::new("gameTrailerUrl", "Game Trailer/Gameplay Video URL", FieldKind::Url, Rule::Url { required: true }),
        FieldSpec::new("gameScreenshotsUrl", "Game Screenshots URL", FieldKind::Url, Rule::Url { required: true }),
        FieldSpec::new("pitchDeckUrl", "Pitch Deck/Presentation URL", FieldKind::Url, Rule::Url { required: true }),
        // Legal and commitment
        FieldSpec::new(
            "ipConfirmation",
            "I confirm that all content in the submitted game is original or properly licensed, \
             and I have the legal right to exhibit this game publicly.",
            FieldKind::Checkbox,
            Rule::confirmation(),
        ),
        FieldSpec::new(
            "commitmentConfirmation",
            "I confirm that if selected, my team will be present for all 3 days of Connecta \
             with a stable demo build and professional booth presence.",
            FieldKind::Checkbox,
            Rule::confirmation(),
        ),
        select("hearAbout", "How did you hear about this opportunity?", &[
            ("social-media", "Cairo ICT/Connecta social media"),
            ("gaming-community", "Gaming community/forum"),
            ("university", "University/academic institution"),
            ("referral", "Friend/colleague referral"),
            ("gaming-media", "Gaming media/press"),
            ("email", "Email announcement"),
            (OTHER, "Other"),
        ]),
        FieldSpec::new(
            "hearAboutOther",
            "Please specify",
            FieldKind::Text,
            Rule::required_when(Condition::equals("hearAbout", OTHER), REQUIRED),
        )
        .visible_when(Condition::equals("hearAbout", OTHER)),
    ]);

    let url_names: Vec<&str> = URL_FIELDS.iter().map(|(name, _, _)| *name).collect();
    let mut marketing = vec!["pressKit", "marketingMaterials"];
    marketing.extend(url_names);

    FlowDefinition {
        key: KEY.into(),
        title: "Game Developer Exhibition Application".into(),
        collection: COLLECTION.into(),
        draft_key: DRAFT_KEY.into(),
        fields,
        plan: StepPlan::Linear(vec![
            StepSpec::new("Basic Information", &[
                "studioName", "contactPerson", "email", "phoneNumber",
                "studioLocation", "studioType", "yearsOfOperation",
            ]),
            StepSpec::new("Game Information", &[
                "gameTitle", "gameGenre", "gameGenreOther", "targetPlatforms", "targetPlatformsOther",
                "gameDevelopmentStatus", "releaseDate", "gameAvailability", "gameAvailabilityOther",
            ]),
            StepSpec::new("Business Readiness", &[
                "registeredBusiness", "monetizationModel", "monetizationModelOther", "totalRevenue",
                "fundingSource", "fundingSourceOther", "businessPlan", "seekingInvestment",
            ]),
            StepSpec::new("Marketing & Press", &marketing),
            StepSpec::new("Exhibition & Demo", &[
                "exhibitionSetup", "exhibitionSetupComments", "demoBuildStatus", "demoDuration",
                "gamePlayability", "playerStatistics", "previousExhibition",
            ]),
            StepSpec::new("Motivation & Vision", &[
                "motivationWhy", "gameUniqueness", "targetAudience", "targetAudienceOther",
            ]),
            StepSpec::new("Required Uploads", &["gameTrailerUrl", "gameScreenshotsUrl", "pitchDeckUrl"]),
            StepSpec::new("Legal & Commitment", &[
                "ipConfirmation", "commitmentConfirmation", "hearAbout", "hearAboutOther",
            ]),
        ]),
        age_range: AgeRange::new(16, 100),
        success_message: "Your application has been submitted. We will be in touch soon!".into(),
    }
}

pub struct ExhibitionMapping;

impl RecordMapping for ExhibitionMapping {
    fn create_payload(&self, form: &FormState) -> Value {
        let mut record = Map::new();
        for (field, value) in form.iter() {
            let is_sidecar = ARRAY_SIDECARS.iter().any(|(_, s)| *s == field)
                || MERGED_SIDECARS.iter().any(|(_, s)| *s == field);
            if !is_sidecar {
                record.insert(field.to_string(), to_json(Some(value)));
            }
        }
        record.insert("phoneNumber".into(), Value::String(sanitized_phone(form)));

        for (parent, side) in ARRAY_SIDECARS {
            let detail = form.text(side).trim();
            if form.many(parent).iter().any(|v| v == OTHER) && !detail.is_empty() {
                record.insert(side.to_string(), Value::String(detail.to_string()));
            }
        }
        for (parent, side) in MERGED_SIDECARS {
            let detail = form.text(side).trim();
            if form.text(parent) == OTHER && !detail.is_empty() {
                record.insert(parent.to_string(), Value::String(detail.to_string()));
            }
        }
        Value::Object(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;

    #[test]
    fn test_sidecars_follow_parent() {
        let mut form = definition().defaults();
        form.set("gameGenre", FieldValue::many(["rpg"]));
        form.set("gameGenreOther", FieldValue::text("stale"));
        form.set("targetPlatforms", FieldValue::many(["pc-windows", OTHER]));
        form.set("targetPlatformsOther", FieldValue::text("Steam Deck"));
        form.set("hearAbout", FieldValue::text(OTHER));
        form.set("hearAboutOther", FieldValue::text("A podcast"));
        form.set("phoneNumber", FieldValue::text("+20 101 234 5678"));
        form.set("ipConfirmation", FieldValue::Flag(true));

        let payload = ExhibitionMapping.create_payload(&form);
        assert!(payload.get("gameGenreOther").is_none());
        assert_eq!(payload["targetPlatformsOther"], "Steam Deck");
        assert_eq!(payload["hearAbout"], "A podcast");
        assert!(payload.get("hearAboutOther").is_none());
        assert_eq!(payload["phoneNumber"], "201012345678");
        assert_eq!(payload["ipConfirmation"], true);
        assert_eq!(payload["gameGenre"], serde_json::json!(["rpg"]));
    }

    #[test]
    fn test_eight_sections() {
        let def = definition();
        match &def.plan {
            StepPlan::Linear(steps) => assert_eq!(steps.len(), 8),
            StepPlan::Branching(_) => panic!("exhibition flow is linear"),
        }
        assert_eq!(def.field("websiteUrl").unwrap().rule, Rule::Url { required: false });
    }
}
