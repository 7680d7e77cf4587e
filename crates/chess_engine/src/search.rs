use std::cmp::Reverse;

use rayon::prelude::*;
use shakmaty::{Chess, Move, Position};

use crate::evaluation::{evaluate_position, piece_value};

const MATE_SCORE: i32 = 1_000_000;
const INFINITY: i32 = MATE_SCORE + 1;
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Fixed-depth alpha-beta search. Root moves are searched in parallel; ties
/// go to the earlier move in ordering so the result is deterministic.
pub fn search_best_move(pos: &Chess, depth: u8) -> Option<Move> {
    let mut moves: Vec<Move> = pos.legal_moves().into_iter().collect();
    if moves.is_empty() {
        return None;
    }
    order_moves(&mut moves);

    let remaining = depth.max(1) - 1;
    let scores: Vec<i32> = moves
        .par_iter()
        .map(|mv| {
            let mut child = pos.clone();
            child.play_unchecked(mv);
            -negamax(&child, remaining, -INFINITY, INFINITY, 1)
        })
        .collect();

    let best = scores
        .iter()
        .enumerate()
        .max_by_key(|&(index, &score)| (score, Reverse(index)))
        .map(|(index, _)| index)?;

    log::debug!("search depth {depth}: best score {}", scores[best]);
    moves.into_iter().nth(best)
}

fn negamax(pos: &Chess, depth: u8, mut alpha: i32, beta: i32, ply: i32) -> i32 {
    let legal = pos.legal_moves();
    if legal.is_empty() {
        return if pos.is_check() { -MATE_SCORE + ply } else { 0 };
    }
    if pos.is_insufficient_material() || pos.halfmoves() >= FIFTY_MOVE_HALFMOVES {
        return 0;
    }
    if depth == 0 {
        return evaluate_position(pos);
    }

    let mut moves: Vec<Move> = legal.into_iter().collect();
    order_moves(&mut moves);

    for mv in &moves {
        let mut child = pos.clone();
        child.play_unchecked(mv);
        let score = -negamax(&child, depth - 1, -beta, -alpha, ply + 1);
        if score >= beta {
            return beta;
        }
        alpha = alpha.max(score);
    }
    alpha
}

/// Captures first, most valuable victim by least valuable attacker, then
/// promotions.
fn order_moves(moves: &mut [Move]) {
    moves.sort_by_key(|mv| Reverse(move_score(mv)));
}

fn move_score(mv: &Move) -> i32 {
    let capture = mv
        .capture()
        .map_or(0, |victim| piece_value(victim) * 10 - piece_value(mv.role()) / 10);
    let promotion = mv.promotion().map_or(0, piece_value);
    capture + promotion
}
