//! Prompt builders for the four advisory operations
//!
//! Each prompt embeds the caller's inputs and spells out the exact JSON
//! shape the response contract in `agrisense_core::contract` will accept.

use crate::llm::{CompletionRequest, InlineImage};

const SYSTEM_PROMPT: &str = "You are an expert agricultural advisor specialising in organic \
     farming for smallholder farms. Base every answer on the details provided. \
     Respond with a single JSON value in exactly the requested structure and nothing else.";

fn photo_note(photos: &[InlineImage], subject: &str, judge: &str) -> String {
    if photos.is_empty() {
        String::new()
    } else {
        format!(
            "\n{} {subject} photo(s) are attached; use them to judge {judge}.\n",
            photos.len()
        )
    }
}

pub fn land_analysis(description: &str, location: &str, photos: &[InlineImage]) -> CompletionRequest {
    let photo_note = photo_note(photos, "soil", "texture, colour and moisture");

    let prompt = format!(
        "Analyze the following land for organic farming.\n\n\
         Location: {location}\n\
         Description: {description}\n{photo_note}\n\
         Provide:\n\
         1. Estimated soil type\n\
         2. Likely pH level (between 4.0 and 9.0)\n\
         3. Moisture level (Low/Medium/High)\n\
         4. Fertility level (Poor/Fair/Good/Excellent)\n\
         5. 3-5 specific recommendations for improvement\n\
         6. 4-6 suitable crops for this land\n\
         7. Confidence level (0-100)\n\n\
         Format the response as JSON:\n\
         {{\n  \"soilType\": \"string\",\n  \"phLevel\": number,\n  \"moisture\": \"string\",\n  \
         \"fertility\": \"string\",\n  \"recommendations\": [\"string\"],\n  \
         \"suggestedCrops\": [\"string\"],\n  \"confidence\": number\n}}"
    );

    CompletionRequest::new(SYSTEM_PROMPT, prompt).with_images(photos.iter().cloned())
}

pub fn crop_recommendations(
    soil_type: &str,
    location: &str,
    season: &str,
    land_size_acres: f64,
) -> CompletionRequest {
    let prompt = format!(
        "Recommend the best crops for:\n\n\
         Soil Type: {soil_type}\n\
         Location: {location}\n\
         Season: {season}\n\
         Land Size: {land_size_acres} acres\n\n\
         Provide 6-8 crop recommendations, each with:\n\
         1. Crop name and variety\n\
         2. Growth period in days\n\
         3. Water requirements (Low/Medium-Low/Medium/Medium-High/High)\n\
         4. Expected yield\n\
         5. Expected profit in INR per acre\n\
         6. Difficulty level (Easy/Medium/Hard)\n\
         7. Market demand score (0-5)\n\
         8. Best planting season (Summer/Winter/Monsoon/Spring/Autumn/Year-round)\n\n\
         Format as a JSON array:\n\
         [\n  {{\n    \"name\": \"string\",\n    \"variety\": \"string\",\n    \
         \"growthPeriod\": number,\n    \"waterNeeds\": \"string\",\n    \
         \"expectedYield\": \"string\",\n    \"expectedProfit\": number,\n    \
         \"difficulty\": \"string\",\n    \"marketDemand\": number,\n    \
         \"seasonality\": \"string\"\n  }}\n]"
    );

    CompletionRequest::new(SYSTEM_PROMPT, prompt)
}

pub fn growth_insights(
    crop_name: &str,
    current_stage: &str,
    days_since_planting: i64,
    health_status: &str,
    weather_conditions: &str,
    photos: &[InlineImage],
) -> CompletionRequest {
    let photo_note = photo_note(
        photos,
        "crop",
        "leaf colour, pest or disease damage and overall vigour",
    );

    let prompt = format!(
        "Analyze the growth progress of:\n\n\
         Crop: {crop_name}\n\
         Current Stage: {current_stage}\n\
         Days Since Planting: {days_since_planting}\n\
         Health Status: {health_status}\n\
         Weather: {weather_conditions}\n{photo_note}\n\
         Provide:\n\
         1. 3-4 growth insights\n\
         2. 3-4 actionable recommendations\n\
         3. Next growth milestone with the expected number of days\n\
         4. Estimated time to harvest\n\n\
         Format as JSON:\n\
         {{\n  \"insights\": [\"string\"],\n  \"recommendations\": [\"string\"],\n  \
         \"nextMilestone\": \"string\",\n  \"estimatedHarvestDate\": \"string\"\n}}"
    );

    CompletionRequest::new(SYSTEM_PROMPT, prompt).with_images(photos.iter().cloned())
}

pub fn organic_solution(problem: &str, crop_type: &str, severity: &str) -> CompletionRequest {
    let prompt = format!(
        "Provide an organic solution for:\n\n\
         Problem: {problem}\n\
         Crop: {crop_type}\n\
         Severity: {severity}\n\n\
         Provide:\n\
         1. Solution name\n\
         2. Natural ingredients list\n\
         3. Step-by-step preparation instructions\n\
         4. Effectiveness rating (1-5)\n\
         5. Application method\n\n\
         Format as JSON:\n\
         {{\n  \"solution\": \"string\",\n  \"ingredients\": [\"string\"],\n  \
         \"instructions\": \"string\",\n  \"effectiveness\": number,\n  \
         \"applicationMethod\": \"string\"\n}}"
    );

    CompletionRequest::new(SYSTEM_PROMPT, prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_land_prompt_embeds_inputs_and_photos() {
        let request = land_analysis("red soil, gentle slope", "Kolar", &[InlineImage::jpeg("AA==")]);
        assert!(request.prompt.contains("Location: Kolar"));
        assert!(request.prompt.contains("red soil, gentle slope"));
        assert!(request.prompt.contains("1 soil photo(s)"));
        assert!(request.prompt.contains("\"suggestedCrops\""));
        assert_eq!(request.images.len(), 1);
        assert!(!request.system_prompt.is_empty());
    }

    #[test]
    fn test_crop_prompt_asks_for_array() {
        let request = crop_recommendations("Black cotton", "Akola", "Monsoon", 3.5);
        assert!(request.prompt.contains("Land Size: 3.5 acres"));
        assert!(request.prompt.contains("\"seasonality\""));
        assert!(request.prompt.trim_end().ends_with(']'));
        assert!(request.images.is_empty());
    }

    #[test]
    fn test_growth_and_remedy_prompts() {
        let growth = growth_insights("Tomato", "Flowering", 45, "Healthy", "Sunny, 28°C", &[]);
        assert!(growth.prompt.contains("Days Since Planting: 45"));
        assert!(growth.prompt.contains("\"estimatedHarvestDate\""));
        assert!(!growth.prompt.contains("photo(s)"));
        assert!(growth.images.is_empty());

        let remedy = organic_solution("aphids", "Chilli", "High");
        assert!(remedy.prompt.contains("Problem: aphids"));
        assert!(remedy.prompt.contains("\"applicationMethod\""));
    }

    #[test]
    fn test_growth_prompt_carries_crop_photos() {
        let photos = [InlineImage::jpeg("AA=="), InlineImage::jpeg("BB==")];
        let request = growth_insights("Okra", "Flowering", 50, "Curling leaves", "Dry", &photos);
        assert!(request.prompt.contains("2 crop photo(s)"));
        assert!(request.prompt.contains("Health Status: Curling leaves"));
        assert_eq!(request.images.len(), 2);
    }
}
