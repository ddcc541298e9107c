pub mod trainer_data;
