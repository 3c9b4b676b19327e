//! Built-in section texts used when the caller enables a section without content.
//!
//! Entries containing `{company}` are interpolated with the resolved company name.

// ────────────────────────────────────────────────────────────────────────────
// Headings
// ────────────────────────────────────────────────────────────────────────────

pub const NOTE_HEADING: &str = "NOTE:";
pub const MATERIAL_SPEC_HEADING: &str = "MATERIAL SPECIFICATION: -";
pub const WARRANTY_HEADING: &str = "THE WARRANTY WILL NOT BE APPLICABLE FOR THE FOLLOWING CASES:";
pub const TERMS_HEADING: &str = "TERMS AND CONDITIONS: -";
pub const SUPPLIER_SCOPE_HEADING: &str = "SUPPLIER SCOPE: -";
pub const CUSTOMER_SCOPE_HEADING: &str = "CUSTOMER SCOPE: -";
pub const FINAL_NOTE_HEADING: &str = "NOTE: -";

pub const GREETING: &str = "Dear Sir,";
pub const INTRO_PREFIX: &str = "With reference to your enquiry, we would like to give our competitive offer for ";
pub const INTRO_SUFFIX: &str = " as follows";
pub const YOURS_TRULY: &str = "Yours truly,";
pub const SUMMARY_PREFIX: &str = "GRP SECTIONAL WATER TANK - 10 YEAR WARRANTY";

// ────────────────────────────────────────────────────────────────────────────
// Default bodies
// ────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_NOTES: &[&str] = &[
    "DURING MAINTENANCE OF THE PARTITION TANK, THE WATER LEVELS IN EACH COMPARTMENT SHOULD BE REDUCED EQUALLY. THE MAXIMUM ALLOWABLE WATER HEIGHT IN EACH COMPARTMENT IS UPTO 1 MTR HEIGHT",
    "THE ABOVE TANK ONLY SUITABLE FOR STORING PORTABLE/ DRINKING WATER EXCEPT CHEMICAL /SOLID/TSE WATER.",
    "THE OFFER IS VALID FOR 30 DAYS FROM THE QUOTATION DATE.",
];

pub const DEFAULT_CLOSING: &str = "We hope the above offer meets your requirements and awaiting the valuable order confirmation.\n\
If you have any questions concerning the offer, please contact the undersigned.";

pub const DEFAULT_MATERIAL_SPEC: &[&str] = &[
    "WRAS Approved Product.",
    "Sealant Tape – Non-Toxic PVC Foam Type.",
    "Roof Panel Vertical Support (Internal) – PVC Pipe.",
    "All Internal Metallic parts in continuous contact with water are Stainless Steel 316/A4 grade and External HDG Support Accessories with HDG Bolt/Nut/Washers.",
    "Manhole: 750mm Dia. with sealed cover and Lock. – 1 No.",
    "For 1 Mtr. height tank, Wall flat – 1 No. & Drain flat – 1 No.",
    "Clear Tube type level indicator (Without Marking) for 2 Mtr. height tank and above only.",
    "HDG Steel Skid with HDG Bolt / Nut / Washer for 2 Mtr. height tank and above only.",
    "Internal Ladder (HDG) and External Ladder (HDG) for 2 Mtr. height tank and above only.",
    "Air Vent, Inlet, Outlet, Overflow and Drain – 1 No. each with PVC flange (FL/PL) connections up to 3″.",
    "Manufacturer Warranty: 10 Year from the date of installation / testing and commissioning.",
];

pub const DEFAULT_WARRANTY: &[&str] = &[
    "Any damage / loss caused directly or indirectly by natural calamities or any other force majeure conditions beyond the control of the supplier.",
    "Any damage occurs due to storing any chemicals, solids, or any other substances. (The proposed tank is specifically designed and intended only for potable / drinking water storage).",
    "Any defects or damage occur in the foundation that affect the tank.",
    "Any unauthorized modification or repairs made on the tank by parties other than the manufacturer representatives.",
];

pub const DEFAULT_TERMS: &[(&str, &str)] = &[
    ("Price", "The given prices are based on the supply and installation of the tank at your proposed site."),
    ("Validity", "The offer is valid for 30 days only."),
    ("Delivery", "One week from the receipt of advance payment."),
    ("Payment", "Cash/CDC. 40% advance along with the confirmed order and 60% upon delivery of the material at the site. (In the event of late payment, a late payment charge of 2% per month on the contract value will be applied till the outstanding payment is settled)."),
];

pub const DEFAULT_EXTRA_NOTES: &[&str] = &[
    "Any deviations from this quotation to suit the site's condition will have additional cost implications.",
    "If the work is indefinitely delayed beyond 30 days after the delivery of materials due to the issues caused by the customer or site condition, the Company will not be liable for any damage to the supplied materials.",
    "The submission of all related documents, including the warranty certificate, will be done upon receiving the final payment.",
    "Any additional test / lab charges incurred from third parties / external agencies are under the scope of the contractor / client.",
    "Until receiving the final settlement from the client, {company} has reserved the right to use the supplied materials at the site.",
    "The testing and commissioning should be completed within a period of 15 to 30 days from the installation completion date by the Contractor/Client.",
    "For the net volume, a minimum of 30 cm freeboard area is to be calculated from the total height of the tank.",
];

pub const DEFAULT_SUPPLIER_SCOPE: &[&str] = &[
    "Supply, installation & supervision for T & C of the tank at the site.",
    "Basic Hand Toolbox.",
    "Surveyors Equipment's for base skid levelling.",
    "Power Tools – Welding/Grinder/Drill/Tighter Machine /Cables.",
    "Flanges as mentioned in the offer.",
];

pub const DEFAULT_CUSTOMER_SCOPE: &[&str] = &[
    "Material offloading, safe storage, and shifting near the foundation. (If the offloading and lifting team is not ready upon our vehicle's arrival, the delivery may be rescheduled, and a maximum charge of AED 1000 will be applied to the customer for rescheduling).",
    "Crain/Boom Loader/other facilities for offloading.",
    "Other plumbing works / Float Valves/ Valves / Float Switches.",
    "Scaffolding as per the site condition.",
    "Flanges other than specified.",
    "Water Thermos & Rest Rooms to be provided by the Contractor/Client.",
    "Electricity/Generator for installation and water for testing.",
    "Accommodation for the technical staff should be provided by the client/contractor.",
    "Grouting, if required for levelling the tank foundation. (After completing the skid work for clearing the space between the base skid and plinth). After the grouting process, a minimum of 3 days will be required to schedule the installation.",
    "In case of any leakage detected after filling the tank, it shall be drained out (if required) and bear any related expenses for refilling the tank for retesting after the rectification.",
    "Any obligations, including entry permits, labour passes and risk liability insurance policy charges etc.",
];

pub const DEFAULT_FINAL_NOTES: &[&str] = &[
    "Any deviations from this quotation to suit the site's condition will have additional cost implications.",
    "If the work is indefinitely delayed beyond 30 days after the delivery of materials due to the issues caused by the customer or site condition, the company will not be liable for any damage to the supplied materials.",
    "The submission of all related documents, including the warranty certificate, will be done upon receiving the final payment.",
    "Any additional test / lab charges incurred from third parties / external agencies are under the scope of the contractor / client.",
    "Until receiving the final settlement from the client, {company} has reserved the right to use the supplied materials at the site.",
    "The testing and commissioning should be completed within a period of 15 to 30 days from the installation completion date by the Contractor/Client.",
    "For the net capacity, a minimum of 30 cm freeboard area is to be calculated from the total height of the tank.",
];

pub const THANK_YOU: &str = "THANK YOU FOR YOUR BUSINESS";

/// Alignment padding inserted between a known terms key and its colon.
pub fn terms_key_spacing(key: &str) -> &'static str {
    match key {
        "Price" => "         ",
        "Validity" | "Delivery" => "    ",
        _ => "  ",
    }
}

/// Replaces `{company}` placeholders.
pub fn interpolate(items: &[&str], company: &str) -> Vec<String> {
    items
        .iter()
        .map(|s| s.replace("{company}", company))
        .collect()
}
