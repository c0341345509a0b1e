//! Opcode tables for the timeline and per-enemy interpreters.

use std::sync::OnceLock;

use super::timeline::{self, MainContext};
use super::vm::EclContext;
use super::{arithmetic, attack, control, lifecycle, movement};
use crate::error::RuntimeError;
use crate::registry::{OpTable, Registry};
use crate::script::{Args, ScriptFormat};

pub type EclHandler = fn(&mut EclContext<'_>, &mut Args<'_>) -> Result<(), RuntimeError>;
pub type MainHandler = fn(&mut MainContext<'_>, &mut Args<'_>) -> Result<(), RuntimeError>;

pub fn main_registry() -> &'static Registry<MainHandler> {
    static REGISTRY: OnceLock<Registry<MainHandler>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        Registry::<MainHandler>::new(ScriptFormat::EclMain).with_version(
            0,
            OpTable::<MainHandler>::new()
                .op(0, "spawn_enemy", timeline::spawn_enemy)
                .op(2, "spawn_enemy", timeline::spawn_enemy)
                .op(4, "spawn_enemy_mirrored", timeline::spawn_enemy)
                .op(6, "spawn_enemy_mirrored", timeline::spawn_enemy)
                .op(8, "call_msg", timeline::call_msg)
                .op(9, "wait_msg", timeline::wait_msg)
                .op(10, "resume_boss", timeline::resume_boss)
                .op(12, "wait_for_boss_death", timeline::wait_for_boss_death),
        )
    })
}

pub fn sub_registry() -> &'static Registry<EclHandler> {
    static REGISTRY: OnceLock<Registry<EclHandler>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        Registry::<EclHandler>::new(ScriptFormat::EclSub).with_version(
            0,
            OpTable::<EclHandler>::new()
                .op(0, "nop", lifecycle::nop)
                .op(1, "destroy", lifecycle::destroy)
                .op(2, "jump", control::jump)
                .op(3, "jump_counter", control::jump_counter)
                .op(4, "set_int", arithmetic::set_int)
                .op(5, "set_float", arithmetic::set_float)
                .op(6, "set_random_int", arithmetic::set_random_int)
                .op(7, "set_random_int2", arithmetic::set_random_int2)
                .op(8, "set_random_float", arithmetic::set_random_float)
                .op(9, "set_random_float2", arithmetic::set_random_float2)
                .op(10, "store_x", arithmetic::store_x)
                .op(13, "add_int", arithmetic::add_int)
                .op(14, "sub_int", arithmetic::sub_int)
                .op(15, "mul_int", arithmetic::mul_int)
                .op(16, "div_int", arithmetic::div_int)
                .op(17, "mod_int", arithmetic::mod_int)
                .op(18, "inc_int", arithmetic::inc_int)
                .op(19, "inc_float", arithmetic::inc_float)
                .op(20, "add_float", arithmetic::add_float)
                .op(21, "sub_float", arithmetic::sub_float)
                .op(22, "mul_float", arithmetic::mul_float)
                .op(23, "div_float", arithmetic::div_float)
                .op(24, "mod_float", arithmetic::mod_float)
                .op(25, "get_direction", arithmetic::get_direction)
                .op(26, "normalize_angle", arithmetic::normalize_angle)
                .op(27, "compare_int", control::compare_int)
                .op(28, "compare_float", control::compare_float)
                .op(29, "jump_if_less", control::jump_if_less)
                .op(30, "jump_if_less_equal", control::jump_if_less_equal)
                .op(31, "jump_if_equal", control::jump_if_equal)
                .op(32, "jump_if_greater", control::jump_if_greater)
                .op(33, "jump_if_greater_equal", control::jump_if_greater_equal)
                .op(34, "jump_if_not_equal", control::jump_if_not_equal)
                .op(35, "call", control::call)
                .op(36, "ret", control::ret)
                .op(39, "call_if_equal", control::call_if_equal)
                .op(43, "set_pos", movement::set_pos)
                .op(45, "set_angle_and_speed", movement::set_angle_and_speed)
                .op(46, "set_rotation_speed", movement::set_rotation_speed)
                .op(47, "set_speed", movement::set_speed)
                .op(48, "set_acceleration", movement::set_acceleration)
                .op(49, "set_random_angle", movement::set_random_angle)
                .op(51, "target_player", movement::target_player)
                .op(56, "move_to_linear", movement::move_to_linear)
                .op(57, "move_to_decel", movement::move_to_decel)
                .op(58, "move_to_accel", movement::move_to_accel)
                .op(61, "stop_in_linear", movement::stop_in_linear)
                .op(62, "stop_in_decel", movement::stop_in_decel)
                .op(63, "stop_in_accel", movement::stop_in_accel)
                .op(65, "set_screen_box", movement::set_screen_box)
                .op(66, "clear_screen_box", movement::clear_screen_box)
                .op(67, "set_bullet_attributes_aimed_fan", attack::set_bullet_attributes)
                .op(68, "set_bullet_attributes_fan", attack::set_bullet_attributes)
                .op(69, "set_bullet_attributes_aimed_ring", attack::set_bullet_attributes)
                .op(70, "set_bullet_attributes_ring", attack::set_bullet_attributes)
                .op(71, "set_bullet_attributes_offset_ring", attack::set_bullet_attributes)
                .op(72, "set_bullet_attributes_random_speed", attack::set_bullet_attributes)
                .op(73, "set_bullet_attributes_random", attack::set_bullet_attributes)
                .op(75, "set_bullet_interval", attack::set_bullet_interval)
                .op(76, "set_bullet_interval_random_start", attack::set_bullet_interval_random_start)
                .op(77, "delay_attack", attack::delay_attack)
                .op(78, "no_delay_attack", attack::no_delay_attack)
                .op(79, "set_bullet_launch_offset", attack::set_bullet_launch_offset)
                .op(81, "fire", attack::fire)
                .op(85, "new_laser", attack::new_laser)
                .op(86, "new_laser_towards_player", attack::new_laser_towards_player)
                .op(87, "set_upcoming_laser_id", attack::set_upcoming_laser_id)
                .op(88, "alter_laser_angle", attack::alter_laser_angle)
                .op(90, "reposition_laser", attack::reposition_laser)
                .op(92, "cancel_laser", attack::cancel_laser)
                .op(93, "set_spellcard", lifecycle::set_spellcard)
                .op(94, "end_spellcard", lifecycle::end_spellcard)
                .op(95, "spawn_enemy", lifecycle::spawn_enemy)
                .op(96, "kill_all_enemies", lifecycle::kill_all_enemies)
                .op(97, "set_anim", lifecycle::set_anim)
                .op(98, "set_movement_anims", lifecycle::set_movement_anims)
                .op(99, "set_aux_anim", lifecycle::set_aux_anim)
                .op(100, "set_death_anim", lifecycle::set_death_anim)
                .op(101, "set_boss_mode", lifecycle::set_boss_mode)
                .op(103, "set_hitbox", lifecycle::set_hitbox)
                .op(104, "set_collidable", lifecycle::set_collidable)
                .op(105, "set_damageable", lifecycle::set_damageable)
                .op(107, "set_death_flags", lifecycle::set_death_flags)
                .op(108, "set_death_callback", lifecycle::set_death_callback)
                .op(110, "set_boss_resume_callback", lifecycle::set_boss_resume_callback)
                .op(111, "set_life", lifecycle::set_life)
                .op(112, "set_elapsed_time", lifecycle::set_elapsed_time)
                .op(113, "set_low_life_trigger", lifecycle::set_low_life_trigger)
                .op(114, "set_low_life_callback", lifecycle::set_low_life_callback)
                .op(115, "set_timeout", lifecycle::set_timeout)
                .op(116, "set_timeout_callback", lifecycle::set_timeout_callback)
                .op(117, "set_touchable", lifecycle::set_touchable)
                .op(119, "drop_bonus", lifecycle::drop_bonus)
                .op(121, "call_special_function", lifecycle::call_special_function)
                .op(122, "set_special_function_callback", lifecycle::set_special_function_callback)
                .op(123, "skip_frames", control::skip_frames)
                .op(124, "drop_specific_bonus", lifecycle::drop_specific_bonus)
                .op(126, "set_remaining_lives", lifecycle::set_remaining_lives)
                .op(128, "interrupt", lifecycle::interrupt)
                .op(129, "interrupt_aux", lifecycle::interrupt_aux)
                .op(133, "enable_spellcard_effect", lifecycle::enable_spellcard_effect)
                .op(134, "disable_spellcard_effect", lifecycle::disable_spellcard_effect),
        )
    })
}
