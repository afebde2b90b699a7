/// Delta set observation, replacement and grading.
pub mod delta;



/// History table lookup, replacement and hysteresis.
pub mod history;
