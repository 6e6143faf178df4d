pub mod revenue_calculator;
pub mod usecases;
