//! Seeded visa requirements for common passport/destination pairs.

use crate::models::{ChecklistItem, FeeInfo, FormInfo, VisaRequirement};

/// Table key, e.g. `TH_JP_tourism`.
pub fn visa_key(nationality: &str, destination: &str, purpose: &str) -> String {
    format!(
        "{}_{}_{}",
        nationality.trim().to_uppercase(),
        destination.trim().to_uppercase(),
        purpose.trim().to_lowercase()
    )
}

pub fn seeded_requirement(key: &str) -> Option<VisaRequirement> {
    match key {
        "TH_CA_tourism" => Some(VisaRequirement {
            visa_required: true,
            visa_type: "Temporary Resident Visa (TRV)".to_string(),
            checklist: checklist(&[
                ("Valid passport", "Valid for at least 6 months beyond stay"),
                ("Completed application form", "IMM 5257 or IMM 5257E"),
                ("Passport photos", "2 recent photos (35mm x 45mm)"),
                ("Proof of financial support", "Bank statements for last 6 months"),
                ("Travel itinerary", "Flight bookings and accommodation"),
                ("Employment letter", "From current employer (if employed)"),
                ("Invitation letter", "If visiting family/friends"),
            ]),
            forms: forms(&[
                (
                    "IMM 5257 - Application for Visitor Visa",
                    "https://www.canada.ca/en/immigration-refugees-citizenship/services/application/application-forms-guides/imm5257e.html",
                ),
                (
                    "IMM 5645 - Family Information",
                    "https://www.canada.ca/en/immigration-refugees-citizenship/services/application/application-forms-guides/imm5645e.html",
                ),
            ]),
            processing_time: "14-21 days".to_string(),
            fees: Some(fee(100.0, "CAD")),
            validity: "Up to 10 years (multiple entry)".to_string(),
            max_stay_days: Some(180),
            disclaimer: "This is not legal advice. Please verify with official Canadian government sources at canada.ca".to_string(),
        }),
        "TH_JP_tourism" => Some(VisaRequirement {
            visa_required: false,
            visa_type: "Visa Exemption".to_string(),
            checklist: checklist(&[
                ("Valid passport", "Valid for duration of stay"),
                ("Return ticket", "Proof of onward travel"),
                ("Proof of accommodation", "Hotel bookings or invitation letter"),
                ("Sufficient funds", "Approximately 100,000 JPY or equivalent"),
            ]),
            forms: Vec::new(),
            processing_time: "Not applicable".to_string(),
            fees: None,
            validity: "15 days per entry".to_string(),
            max_stay_days: Some(15),
            disclaimer: "This is not legal advice. Visa exemption allows 15-day stay for Thai passport holders. Please verify with Japanese embassy.".to_string(),
        }),
        "TH_US_tourism" => Some(VisaRequirement {
            visa_required: true,
            visa_type: "B-2 Tourist Visa".to_string(),
            checklist: checklist(&[
                ("Valid passport", "Valid for at least 6 months beyond stay"),
                ("DS-160 form", "Online nonimmigrant visa application"),
                ("Passport photo", "Recent 2x2 inch photo"),
                ("Interview appointment", "Schedule at US Embassy Bangkok"),
                ("Proof of ties to Thailand", "Employment letter, property ownership, family ties"),
                ("Financial documents", "Bank statements, income tax returns"),
                ("Travel itinerary", "Detailed travel plans"),
            ]),
            forms: forms(&[(
                "DS-160 - Online Nonimmigrant Visa Application",
                "https://ceac.state.gov/genniv/",
            )]),
            processing_time: "3-5 weeks after interview".to_string(),
            fees: Some(fee(185.0, "USD")),
            validity: "Up to 10 years (multiple entry)".to_string(),
            max_stay_days: Some(180),
            disclaimer: "This is not legal advice. Please verify with the US Embassy in Bangkok at th.usembassy.gov".to_string(),
        }),
        "TH_GB_tourism" => Some(VisaRequirement {
            visa_required: true,
            visa_type: "Standard Visitor Visa".to_string(),
            checklist: checklist(&[
                ("Valid passport", "Valid for at least 6 months"),
                ("Online application form", "Complete on gov.uk"),
                ("Passport photos", "Color photo 45mm x 35mm"),
                ("Financial evidence", "Bank statements for last 6 months"),
                ("Employment documents", "Letter from employer, payslips"),
                ("Accommodation proof", "Hotel bookings or invitation letter"),
                ("Travel itinerary", "Flight bookings"),
                ("Tuberculosis test", "From approved clinic if staying >6 months"),
            ]),
            forms: forms(&[(
                "Online Visa Application",
                "https://www.gov.uk/standard-visitor-visa",
            )]),
            processing_time: "15-21 working days".to_string(),
            fees: Some(fee(115.0, "GBP")),
            validity: "6 months".to_string(),
            max_stay_days: Some(180),
            disclaimer: "This is not legal advice. Please verify with UK Visas and Immigration at gov.uk".to_string(),
        }),
        "US_TH_tourism" => Some(VisaRequirement {
            visa_required: false,
            visa_type: "Visa Exemption".to_string(),
            checklist: checklist(&[
                ("Valid US passport", "Valid for at least 6 months"),
                ("Return ticket", "Proof of onward travel within 30 days"),
                ("Proof of accommodation", "Hotel booking or invitation letter"),
            ]),
            forms: Vec::new(),
            processing_time: "Not applicable".to_string(),
            fees: None,
            validity: "30 days per entry".to_string(),
            max_stay_days: Some(30),
            disclaimer: "This is not legal advice. US passport holders can stay visa-free for 30 days. Please verify with Thai embassy.".to_string(),
        }),
        _ => None,
    }
}

/// Conservative answer when nothing better is known.
pub fn manual_verification_requirement(destination: &str) -> VisaRequirement {
    VisaRequirement {
        visa_required: true,
        visa_type: "Unknown - Manual Verification Required".to_string(),
        checklist: checklist(&[
            ("Valid passport", "Must be valid for at least 6 months beyond travel dates"),
            ("Passport photos", "Recent passport-sized photographs"),
            ("Proof of travel", "Flight tickets or itinerary"),
        ]),
        forms: Vec::new(),
        processing_time: "Unknown".to_string(),
        fees: None,
        validity: String::new(),
        max_stay_days: None,
        disclaimer: format!(
            "⚠️ Visa requirements could not be verified from our database. Please contact the embassy or consulate of {} for accurate information. This is not legal advice.",
            destination.trim()
        ),
    }
}

fn checklist(items: &[(&str, &str)]) -> Vec<ChecklistItem> {
    items
        .iter()
        .map(|(item, notes)| ChecklistItem {
            item: (*item).to_string(),
            notes: (*notes).to_string(),
        })
        .collect()
}

fn forms(items: &[(&str, &str)]) -> Vec<FormInfo> {
    items
        .iter()
        .map(|(name, url)| FormInfo {
            name: (*name).to_string(),
            download_url: (*url).to_string(),
        })
        .collect()
}

fn fee(amount: f64, currency: &str) -> FeeInfo {
    FeeInfo {
        amount,
        currency: currency.to_string(),
    }
}
