use super::config::ScoringConfig;

/// Check one weight: finite and non-negative.
fn check_weight(errors: &mut Vec<String>, path: &str, value: f64) {
    if !value.is_finite() {
        errors.push(format!("{}: must be a finite number", path));
    } else if value < 0.0 {
        errors.push(format!("{}: must be non-negative (got {})", path, value));
    }
}

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let w = &config.weights;
    check_weight(&mut errors, "scoring.weights.price", w.price);
    check_weight(&mut errors, "scoring.weights.location", w.location);
    check_weight(&mut errors, "scoring.weights.size", w.size);
    check_weight(&mut errors, "scoring.weights.amenity", w.amenity);
    let all_valid = w.as_array().iter().all(|v| v.is_finite() && *v >= 0.0);
    if all_valid && w.as_array().iter().sum::<f64>() <= 0.0 {
        errors.push("scoring.weights: at least one category weight must be positive".to_string());
    }

    check_weight(&mut errors, "scoring.price.price", config.price.price);
    check_weight(&mut errors, "scoring.price.price_per_area", config.price.price_per_area);
    check_weight(&mut errors, "scoring.price.fee", config.price.fee);

    check_weight(&mut errors, "scoring.location.metro", config.location.metro);
    check_weight(&mut errors, "scoring.location.default_mode", config.location.default_mode);
    for (mode, weight) in &config.location.modes {
        if mode.trim().is_empty() {
            errors.push("scoring.location.modes: mode name must not be empty".to_string());
        }
        check_weight(&mut errors, &format!("scoring.location.modes.{}", mode), *weight);
    }

    check_weight(&mut errors, "scoring.size.living_area", config.size.living_area);
    check_weight(&mut errors, "scoring.size.rooms", config.size.rooms);

    check_weight(&mut errors, "scoring.amenity.elevator", config.amenity.elevator);
    check_weight(&mut errors, "scoring.amenity.balcony", config.amenity.balcony);
    check_weight(&mut errors, "scoring.amenity.year_built", config.amenity.year_built);
    check_weight(&mut errors, "scoring.amenity.floor", config.amenity.floor);
    if let (Some(min), Some(max)) = (config.floor.preferred_min, config.floor.preferred_max) {
        if min > max {
            errors.push(format!(
                "scoring.floor: preferred_min ({}) must not exceed preferred_max ({})",
                min, max
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
